//! Pose triples shared between the controller and the field renderer.
//!
//! A `Pose` carries no unit or frame information of its own. Poses handed
//! across the `RobotController` boundary are real-world (feet, radians,
//! y up); poses stored by drawable elements are drawing-frame (pixels,
//! y down). Conversion between the two lives in the field crate.

use std::ops::{Add, Sub};

use nalgebra::{Isometry2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Position and orientation triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose { x, y, heading }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Translation part of the pose as a vector.
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(self.translation(), self.heading)
    }

    pub fn from_isometry(iso: &Isometry2<f64>) -> Self {
        Pose {
            x: iso.translation.vector.x,
            y: iso.translation.vector.y,
            heading: iso.rotation.angle(),
        }
    }
}

impl Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Pose) -> Pose {
        Pose::new(self.x + rhs.x, self.y + rhs.y, self.heading + rhs.heading)
    }
}

/// Component-wise difference. Headings are subtracted as-is, without
/// wrapping, so a delta between two absolute poses is exact.
impl Sub for Pose {
    type Output = Pose;

    fn sub(self, rhs: Pose) -> Pose {
        Pose::new(self.x - rhs.x, self.y - rhs.y, self.heading - rhs.heading)
    }
}

/// Pose together with its rate of change, in the same frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinematicState {
    pub pose: Pose,
    /// (vx, vy, omega)
    pub velocity: Pose,
}

impl KinematicState {
    pub fn at(pose: Pose) -> Self {
        KinematicState {
            pose,
            velocity: Pose::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_delta_is_componentwise() {
        let a = Pose::new(3.0, 4.0, 1.0);
        let b = Pose::new(1.0, 1.5, 0.25);
        let d = a - b;
        assert_eq!(d, Pose::new(2.0, 2.5, 0.75));
        assert_eq!(b + d, a);
    }

    #[test]
    fn test_isometry_conversion() {
        let pose = Pose::new(2.0, -1.0, FRAC_PI_2);
        let back = Pose::from_isometry(&pose.to_isometry());
        assert_relative_eq!(back.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(back.heading, FRAC_PI_2, epsilon = 1e-12);
    }
}
