use crate::pose::KinematicState;
use crate::SimContext;

/// A generic integration strategy trait.
pub trait Integrator {
    /// Advances the state by one timestep.
    fn step(&self, ctx: &SimContext, state: &mut KinematicState);
}

/// Semi-implicit Euler integrator (Symplectic Euler).
/// Velocities are set by whoever owns the state before the step; the step
/// integrates the new velocity into the pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn step(&self, ctx: &SimContext, state: &mut KinematicState) {
        let dt = ctx.dt;
        state.pose.x += state.velocity.x * dt;
        state.pose.y += state.velocity.y * dt;
        state.pose.heading += state.velocity.heading * dt;
    }
}

/// Fixed-timestep integration wrapper that accumulates time and
/// runs multiple sub-steps if needed.
#[derive(Debug, Clone)]
pub struct FixedTimestepIntegrator<I: Integrator> {
    pub integrator: I,
    pub fixed_dt: f64,
    pub accumulator: f64,
}

impl<I: Integrator> FixedTimestepIntegrator<I> {
    pub fn new(integrator: I, fixed_dt: f64) -> Self {
        FixedTimestepIntegrator {
            integrator,
            fixed_dt,
            accumulator: 0.0,
        }
    }

    /// Adds `dt` to the accumulator and returns one context per whole
    /// fixed sub-step that now fits. The caller integrates each of its
    /// states once per returned context.
    pub fn sub_steps(&mut self, dt: f64) -> Vec<SimContext> {
        self.accumulator += dt;
        let mut contexts = Vec::new();
        while self.accumulator >= self.fixed_dt {
            contexts.push(SimContext { dt: self.fixed_dt });
            self.accumulator -= self.fixed_dt;
        }
        contexts
    }

    /// Advances a single state, running as many fixed-timestep sub-steps as fit into dt.
    /// Returns the remaining time that didn't fit into a full step.
    pub fn step(&mut self, dt: f64, state: &mut KinematicState) -> f64 {
        for ctx in self.sub_steps(dt) {
            self.integrator.step(&ctx, state);
        }
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
