//! Shared types for the field simulator
//!
//! This crate provides:
//! - `Pose` and kinematic state
//! - The `RobotController` contract the renderer polls each frame
//! - Typed configuration loaded from JSON
//! - Fixed-timestep integrators

pub mod color;
pub mod config;
pub mod integrators;
pub mod pose;
mod traits;

pub use color::{Color, ParseColorError};
pub use config::{
    Axis, Config, ConfigError, FieldConfig, FieldObjectConfig, ObjectShape, PeripheralConfig,
    RobotConfig, SimConfig, SimTypeConfig,
};
pub use pose::{KinematicState, Pose};
pub use traits::*;
