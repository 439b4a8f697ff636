//! Drawing-surface capability and an in-memory implementation.
//!
//! The field and robot only ever talk to a `DrawingSurface`. Any canvas or
//! immediate-mode renderer can satisfy it; `RecordingSurface` keeps the
//! shapes in memory so a frontend can paint them each frame and tests can
//! inspect them.

use std::path::{Path, PathBuf};

use nalgebra::Point2;
use simcore::Color;

/// Handle to a shape created on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub usize);

pub trait DrawingSurface {
    fn set_size(&mut self, width: f64, height: f64);

    fn create_rectangle(
        &mut self,
        top_left: Point2<f64>,
        bottom_right: Point2<f64>,
        outline: Color,
        fill: Color,
    ) -> ShapeId;

    fn create_polygon(&mut self, points: &[Point2<f64>], fill: Color) -> ShapeId;

    /// Replace the vertices of an existing polygon.
    fn update_polygon(&mut self, id: ShapeId, points: &[Point2<f64>]);

    fn set_fill(&mut self, id: ShapeId, color: Color);

    /// Place an image centered on `center`.
    fn create_image(&mut self, center: Point2<f64>, path: &Path) -> ShapeId;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceItem {
    Rectangle {
        min: Point2<f64>,
        max: Point2<f64>,
        outline: Color,
        fill: Color,
    },
    Polygon {
        points: Vec<Point2<f64>>,
        fill: Color,
    },
    Image {
        center: Point2<f64>,
        path: PathBuf,
    },
}

/// Retained list of shapes in creation (paint) order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    items: Vec<SurfaceItem>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn items(&self) -> &[SurfaceItem] {
        &self.items
    }

    pub fn item(&self, id: ShapeId) -> Option<&SurfaceItem> {
        self.items.get(id.0)
    }

    pub fn polygon_points(&self, id: ShapeId) -> Option<&[Point2<f64>]> {
        match self.items.get(id.0) {
            Some(SurfaceItem::Polygon { points, .. }) => Some(points),
            _ => None,
        }
    }

    pub fn fill(&self, id: ShapeId) -> Option<Color> {
        match self.items.get(id.0) {
            Some(SurfaceItem::Polygon { fill, .. }) | Some(SurfaceItem::Rectangle { fill, .. }) => {
                Some(*fill)
            }
            _ => None,
        }
    }

    fn push(&mut self, item: SurfaceItem) -> ShapeId {
        self.items.push(item);
        ShapeId(self.items.len() - 1)
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn create_rectangle(
        &mut self,
        top_left: Point2<f64>,
        bottom_right: Point2<f64>,
        outline: Color,
        fill: Color,
    ) -> ShapeId {
        self.push(SurfaceItem::Rectangle {
            min: top_left,
            max: bottom_right,
            outline,
            fill,
        })
    }

    fn create_polygon(&mut self, points: &[Point2<f64>], fill: Color) -> ShapeId {
        self.push(SurfaceItem::Polygon {
            points: points.to_vec(),
            fill,
        })
    }

    fn update_polygon(&mut self, id: ShapeId, new_points: &[Point2<f64>]) {
        match self.items.get_mut(id.0) {
            Some(SurfaceItem::Polygon { points, .. }) => {
                points.clear();
                points.extend_from_slice(new_points);
            }
            _ => log::warn!("update_polygon: {:?} is not a polygon", id),
        }
    }

    fn set_fill(&mut self, id: ShapeId, color: Color) {
        match self.items.get_mut(id.0) {
            Some(SurfaceItem::Polygon { fill, .. }) | Some(SurfaceItem::Rectangle { fill, .. }) => {
                *fill = color;
            }
            _ => log::warn!("set_fill: {:?} has no fill", id),
        }
    }

    fn create_image(&mut self, center: Point2<f64>, path: &Path) -> ShapeId {
        self.push(SurfaceItem::Image {
            center,
            path: path.to_path_buf(),
        })
    }
}
