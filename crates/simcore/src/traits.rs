use thiserror::Error;

use crate::pose::Pose;

#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    pub dt: f64,
}

pub trait Model {
    fn reset(&mut self);
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("no peripheral named `{0}` is registered with the controller")]
    UnknownPeripheral(String),
}

/// Pose source consumed by the field renderer.
///
/// All poses crossing this boundary are real-world: feet, radians,
/// origin bottom-left, y up. Calls must return immediately; they are
/// made from inside the render tick.
pub trait RobotController {
    /// Current pose of the robot body.
    fn pose(&self) -> Pose;

    /// Current pose of a registered peripheral.
    fn peripheral_pose(&self, name: &str) -> Result<Pose, ControllerError>;

    /// Whether the robot is currently enabled.
    fn is_active(&self) -> bool;

    /// Announce a peripheral so later `peripheral_pose` calls can address
    /// it by name. Registering a name twice replaces the earlier entry.
    fn register_peripheral(&mut self, name: &str, initial_pose: Pose);
}
