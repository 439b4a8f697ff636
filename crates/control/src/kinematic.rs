//! Kinematic Controller
//!
//! An in-process pose source for the field renderer. The robot body follows
//! a field-oriented velocity command; peripherals ride rigidly on the body
//! and can additionally spin about their own centers.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use nalgebra::Isometry2;
use simcore::integrators::{FixedTimestepIntegrator, Integrator, SemiImplicitEuler};
use simcore::{ControllerError, KinematicState, Model, Pose, RobotController};

/// Integration step used by the controller, in seconds
pub const DEFAULT_DT: f64 = 1e-3;

/// Scale applied to normalized drive commands.
#[derive(Debug, Clone, Copy)]
pub struct DriveLimits {
    /// Translation speed at full command (ft/s)
    pub max_speed_ft_s: f64,
    /// Rotation rate at full command (rad/s)
    pub max_omega_rad_s: f64,
}

impl Default for DriveLimits {
    fn default() -> Self {
        DriveLimits {
            max_speed_ft_s: 10.0,
            max_omega_rad_s: PI,
        }
    }
}

/// Normalized drive command, each component in [-1, 1], field frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveCommand {
    pub vx: f64,
    pub vy: f64,
    pub omega: f64,
}

#[derive(Debug, Clone)]
struct Peripheral {
    /// Pose of the peripheral relative to the robot body at registration
    offset: Isometry2<f64>,
    /// Joint rotation about the peripheral's own center; only `heading` is used
    joint: KinematicState,
    rate: f64,
}

pub struct KinematicController {
    limits: DriveLimits,
    start: Pose,
    robot: KinematicState,
    command: DriveCommand,
    peripherals: BTreeMap<String, Peripheral>,
    enabled: bool,
    integrator: FixedTimestepIntegrator<SemiImplicitEuler>,
}

impl KinematicController {
    /// Create a controller holding the robot at `start` (real-world units).
    /// The robot starts enabled.
    pub fn new(start: Pose, limits: DriveLimits) -> Self {
        KinematicController {
            limits,
            start,
            robot: KinematicState::at(start),
            command: DriveCommand::default(),
            peripherals: BTreeMap::new(),
            enabled: true,
            integrator: FixedTimestepIntegrator::new(SemiImplicitEuler, DEFAULT_DT),
        }
    }

    pub fn set_drive(&mut self, vx: f64, vy: f64, omega: f64) {
        self.command = DriveCommand {
            vx: vx.clamp(-1.0, 1.0),
            vy: vy.clamp(-1.0, 1.0),
            omega: omega.clamp(-1.0, 1.0),
        };
    }

    pub fn command(&self) -> DriveCommand {
        self.command
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            log::info!("robot {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Set the joint rate of a peripheral, normalized to [-1, 1].
    pub fn set_peripheral_rate(&mut self, name: &str, rate: f64) -> Result<(), ControllerError> {
        let peripheral = self
            .peripherals
            .get_mut(name)
            .ok_or_else(|| ControllerError::UnknownPeripheral(name.to_owned()))?;
        peripheral.rate = rate.clamp(-1.0, 1.0);
        Ok(())
    }

    /// Names of registered peripherals, sorted.
    pub fn peripheral_names(&self) -> impl Iterator<Item = &str> {
        self.peripherals.keys().map(String::as_str)
    }

    /// Advance the simulation by `dt` seconds of wall time.
    pub fn step(&mut self, dt: f64) {
        let scale = if self.enabled { 1.0 } else { 0.0 };
        self.robot.velocity = Pose::new(
            self.command.vx * self.limits.max_speed_ft_s * scale,
            self.command.vy * self.limits.max_speed_ft_s * scale,
            self.command.omega * self.limits.max_omega_rad_s * scale,
        );
        for peripheral in self.peripherals.values_mut() {
            peripheral.joint.velocity.heading = peripheral.rate * self.limits.max_omega_rad_s * scale;
        }

        let stepper = self.integrator.integrator;
        for ctx in self.integrator.sub_steps(dt) {
            stepper.step(&ctx, &mut self.robot);
            for peripheral in self.peripherals.values_mut() {
                stepper.step(&ctx, &mut peripheral.joint);
            }
        }
    }
}

impl Model for KinematicController {
    fn reset(&mut self) {
        self.robot = KinematicState::at(self.start);
        self.command = DriveCommand::default();
        for peripheral in self.peripherals.values_mut() {
            peripheral.joint = KinematicState::default();
            peripheral.rate = 0.0;
        }
        self.integrator.reset();
    }
}

impl RobotController for KinematicController {
    fn pose(&self) -> Pose {
        self.robot.pose
    }

    fn peripheral_pose(&self, name: &str) -> Result<Pose, ControllerError> {
        let peripheral = self
            .peripherals
            .get(name)
            .ok_or_else(|| ControllerError::UnknownPeripheral(name.to_owned()))?;
        let world = self.robot.pose.to_isometry()
            * peripheral.offset
            * Isometry2::rotation(peripheral.joint.pose.heading);
        let mut pose = Pose::from_isometry(&world);
        // keep the heading continuous instead of wrapping into (-pi, pi]
        pose.heading = self.robot.pose.heading + peripheral.offset.rotation.angle() + peripheral.joint.pose.heading;
        Ok(pose)
    }

    fn is_active(&self) -> bool {
        self.enabled
    }

    fn register_peripheral(&mut self, name: &str, initial_pose: Pose) {
        let offset = self.robot.pose.to_isometry().inverse() * initial_pose.to_isometry();
        log::debug!(
            "registered peripheral `{}` at ({:.2}, {:.2}, {:.3})",
            name,
            initial_pose.x,
            initial_pose.y,
            initial_pose.heading
        );
        self.peripherals.insert(
            name.to_owned(),
            Peripheral {
                offset,
                joint: KinematicState::default(),
                rate: 0.0,
            },
        );
    }
}
