//! 2D field rendering for robot simulations
//!
//! This crate provides:
//! - Conversion between real-world (feet, y up) and drawing (pixels, y down) frames
//! - Drawable polygons and composites that translate and rotate in place
//! - The `Field`, which draws the grid and static objects and ticks its elements
//! - The `RobotElement`, which mirrors a controller's robot and peripheral poses

use std::cell::RefCell;
use std::rc::Rc;

use simcore::{Config, RobotController};

pub mod element;
pub mod error;
pub mod field;
pub mod robot;
pub mod surface;
pub mod transform;

pub use element::{CompositeElement, Drawable, DrawableElement, FieldElement};
pub use error::FieldError;
pub use field::Field;
pub use robot::RobotElement;
pub use surface::{DrawingSurface, RecordingSurface, ShapeId, SurfaceItem};
pub use transform::FieldTransform;

/// Build the field described by `config` on `surface` and place the robot
/// reported by `controller` on it. Peripherals are registered with the
/// controller before this returns.
pub fn build_field<S, C>(config: &Config, surface: S, controller: Rc<RefCell<C>>) -> Field<S>
where
    S: DrawingSurface,
    C: RobotController + 'static,
{
    let mut field = Field::new(config, surface);
    field.add_moving_element(Box::new(RobotElement::new(controller, config)));
    field
}
