//! Drawable polygons and groups of polygons that move together.

use nalgebra::{Point2, Rotation2, Vector2};
use simcore::Color;

use crate::error::FieldError;
use crate::surface::{DrawingSurface, ShapeId};

/// Shape-level operations shared by single polygons and composites.
/// All coordinates are drawing-frame pixels.
pub trait Drawable {
    /// Create the shape(s) on the surface.
    fn initialize(&mut self, surface: &mut dyn DrawingSurface);

    /// Translate every point, and the center if any, by `delta`.
    fn translate(&mut self, delta: Vector2<f64>);

    /// Rotate every point by `angle` radians about the shape's center.
    fn rotate(&mut self, angle: f64);

    /// Push the current points to the surface. No-op before `initialize`.
    fn update_coordinates(&self, surface: &mut dyn DrawingSurface);
}

/// Something the field owns and ticks once per frame.
pub trait FieldElement {
    /// Called once when the element is added to the field.
    fn attach(&mut self, surface: &mut dyn DrawingSurface);

    fn perform_move(&mut self, surface: &mut dyn DrawingSurface) -> Result<(), FieldError>;
}

/// A filled polygon. Point order defines the edges.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableElement {
    points: Vec<Point2<f64>>,
    center: Option<Point2<f64>>,
    /// Sum of all rotations applied since construction
    rotation: f64,
    color: Color,
    handle: Option<ShapeId>,
}

impl DrawableElement {
    pub fn new(points: Vec<Point2<f64>>, center: Option<Point2<f64>>, color: Color) -> Self {
        DrawableElement {
            points,
            center,
            rotation: 0.0,
            color,
            handle: None,
        }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn center(&self) -> Option<Point2<f64>> {
        self.center
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn handle(&self) -> Option<ShapeId> {
        self.handle
    }

    /// Rotation pivot: the declared center, or the vertex mean for shapes
    /// created without one.
    pub fn pivot(&self) -> Point2<f64> {
        if let Some(center) = self.center {
            return center;
        }
        if self.points.is_empty() {
            return Point2::origin();
        }
        let sum = self
            .points
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / self.points.len() as f64)
    }

    pub fn set_color(&mut self, color: Color, surface: &mut dyn DrawingSurface) {
        self.color = color;
        if let Some(handle) = self.handle {
            surface.set_fill(handle, color);
        }
    }
}

impl Drawable for DrawableElement {
    fn initialize(&mut self, surface: &mut dyn DrawingSurface) {
        self.handle = Some(surface.create_polygon(&self.points, self.color));
    }

    fn translate(&mut self, delta: Vector2<f64>) {
        for p in &mut self.points {
            *p += delta;
        }
        if let Some(center) = &mut self.center {
            *center += delta;
        }
    }

    fn rotate(&mut self, angle: f64) {
        let pivot = self.pivot();
        let rot = Rotation2::new(angle);
        for p in &mut self.points {
            *p = pivot + rot * (*p - pivot);
        }
        self.rotation += angle;
    }

    fn update_coordinates(&self, surface: &mut dyn DrawingSurface) {
        if let Some(handle) = self.handle {
            surface.update_polygon(handle, &self.points);
        }
    }
}

/// Static shapes only need to be drawn once.
impl FieldElement for DrawableElement {
    fn attach(&mut self, surface: &mut dyn DrawingSurface) {
        self.initialize(surface);
    }

    fn perform_move(&mut self, _surface: &mut dyn DrawingSurface) -> Result<(), FieldError> {
        Ok(())
    }
}

/// Ordered group of drawables. Every operation is applied to each member
/// in list order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeElement<T = DrawableElement> {
    members: Vec<T>,
}

impl<T> Default for CompositeElement<T> {
    fn default() -> Self {
        CompositeElement { members: Vec::new() }
    }
}

impl<T> CompositeElement<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<T>) -> Self {
        CompositeElement { members }
    }

    pub fn push(&mut self, member: T) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [T] {
        &mut self.members
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.members.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.members.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T: Drawable> Drawable for CompositeElement<T> {
    fn initialize(&mut self, surface: &mut dyn DrawingSurface) {
        for member in &mut self.members {
            member.initialize(surface);
        }
    }

    fn translate(&mut self, delta: Vector2<f64>) {
        for member in &mut self.members {
            member.translate(delta);
        }
    }

    fn rotate(&mut self, angle: f64) {
        for member in &mut self.members {
            member.rotate(angle);
        }
    }

    fn update_coordinates(&self, surface: &mut dyn DrawingSurface) {
        for member in &self.members {
            member.update_coordinates(surface);
        }
    }
}

impl Drawable for Box<dyn Drawable> {
    fn initialize(&mut self, surface: &mut dyn DrawingSurface) {
        (**self).initialize(surface)
    }

    fn translate(&mut self, delta: Vector2<f64>) {
        (**self).translate(delta)
    }

    fn rotate(&mut self, angle: f64) {
        (**self).rotate(angle)
    }

    fn update_coordinates(&self, surface: &mut dyn DrawingSurface) {
        (**self).update_coordinates(surface)
    }
}
