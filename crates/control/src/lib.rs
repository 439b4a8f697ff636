//! Controllers that report robot poses to the field renderer
//!
//! This crate provides:
//! - `KinematicController`, a field-oriented velocity-driven pose source
//! - Drive limits and normalized drive commands

pub mod kinematic;

pub use kinematic::*;
