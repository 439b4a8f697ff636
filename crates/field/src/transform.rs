//! Conversion between the real-world frame and the drawing frame.
//!
//! Real-world: feet, origin at the bottom-left of the field, y up (or y
//! down for `Axis::YDown` simulation types). Drawing: pixels, origin at
//! the top-left of the surface, y down, with the field inset by `margin`.

use nalgebra::Point2;
use simcore::{Axis, Config, Pose};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTransform {
    pub px_per_ft: f64,
    pub margin: f64,
    /// Height of the field in feet (number of grid rows)
    pub field_height_ft: f64,
    pub axis: Axis,
}

impl FieldTransform {
    pub fn new(config: &Config) -> Self {
        FieldTransform {
            px_per_ft: config.field.px_per_ft,
            margin: config.margin,
            field_height_ft: config.field.h as f64,
            axis: config.axis,
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Convert a length in feet to pixels.
    pub fn length(&self, feet: f64) -> f64 {
        feet * self.px_per_ft
    }

    pub fn to_drawing(&self, p: Point2<f64>) -> Point2<f64> {
        let x = self.margin + p.x * self.px_per_ft;
        let y = match self.axis {
            Axis::YUp => self.margin + (self.field_height_ft - p.y) * self.px_per_ft,
            Axis::YDown => self.margin + p.y * self.px_per_ft,
        };
        Point2::new(x, y)
    }

    /// Inverse of `to_drawing`.
    pub fn to_real(&self, p: Point2<f64>) -> Point2<f64> {
        let x = (p.x - self.margin) / self.px_per_ft;
        let y = match self.axis {
            Axis::YUp => self.field_height_ft - (p.y - self.margin) / self.px_per_ft,
            Axis::YDown => (p.y - self.margin) / self.px_per_ft,
        };
        Point2::new(x, y)
    }

    /// `to_drawing` snapped to whole pixels, used for static field objects.
    pub fn to_drawing_rounded(&self, p: Point2<f64>) -> Point2<f64> {
        let x = self.margin + (p.x * self.px_per_ft).round();
        let y = match self.axis {
            Axis::YUp => self.margin + ((self.field_height_ft - p.y) * self.px_per_ft).round(),
            Axis::YDown => self.margin + (p.y * self.px_per_ft).round(),
        };
        Point2::new(x, y)
    }

    /// Heading as seen on the drawing surface. Flipping the y axis mirrors
    /// the sense of rotation.
    fn heading_sign(&self) -> f64 {
        match self.axis {
            Axis::YUp => -1.0,
            Axis::YDown => 1.0,
        }
    }

    pub fn pose_to_drawing(&self, pose: Pose) -> Pose {
        let p = self.to_drawing(pose.position());
        Pose::new(p.x, p.y, self.heading_sign() * pose.heading)
    }

    pub fn pose_to_real(&self, pose: Pose) -> Pose {
        let p = self.to_real(pose.position());
        Pose::new(p.x, p.y, self.heading_sign() * pose.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform(axis: Axis) -> FieldTransform {
        FieldTransform {
            px_per_ft: 10.0,
            margin: 20.0,
            field_height_ft: 27.0,
            axis,
        }
    }

    #[test]
    fn test_y_up_flips_and_offsets() {
        let t = transform(Axis::YUp);
        let p = t.to_drawing(Point2::new(10.0, 5.0));
        assert_relative_eq!(p.x, 120.0);
        assert_relative_eq!(p.y, 240.0);

        // bottom-left corner of the field sits at the bottom margin
        let origin = t.to_drawing(Point2::origin());
        assert_relative_eq!(origin.x, 20.0);
        assert_relative_eq!(origin.y, 290.0);
    }

    #[test]
    fn test_y_down_keeps_orientation() {
        let t = transform(Axis::YDown);
        let p = t.to_drawing(Point2::new(10.0, 5.0));
        assert_relative_eq!(p.x, 120.0);
        assert_relative_eq!(p.y, 70.0);
        assert_eq!(t.pose_to_drawing(Pose::new(0.0, 0.0, 1.25)).heading, 1.25);
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            Point2::new(0.0, 0.0),
            Point2::new(13.37, 4.2),
            Point2::new(53.9, 26.99),
            Point2::new(-1.5, 30.25),
        ];
        for axis in [Axis::YUp, Axis::YDown] {
            let t = transform(axis);
            for p in samples {
                let back = t.to_real(t.to_drawing(p));
                assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
                assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_pose_round_trip_negates_heading_once() {
        let t = transform(Axis::YUp);
        let real = Pose::new(3.5, 7.25, 0.4);
        let drawn = t.pose_to_drawing(real);
        assert_relative_eq!(drawn.heading, -0.4);
        let back = t.pose_to_real(drawn);
        assert_relative_eq!(back.x, real.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, real.y, epsilon = 1e-9);
        assert_relative_eq!(back.heading, real.heading, epsilon = 1e-12);
    }

    #[test]
    fn test_rounded_conversion() {
        let t = transform(Axis::YUp).with_axis(Axis::YUp);
        let p = t.to_drawing_rounded(Point2::new(1.26, 2.04));
        // 12.6 -> 13, (27 - 2.04) * 10 = 249.6 -> 250
        assert_eq!(p, Point2::new(33.0, 270.0));
    }
}
