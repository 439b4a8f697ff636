//! The playing field: grid, background image, static objects, and the list
//! of elements ticked every frame.

use nalgebra::Point2;
use simcore::{Axis, Color, Config};

use crate::element::{DrawableElement, FieldElement};
use crate::error::FieldError;
use crate::surface::DrawingSurface;
use crate::transform::FieldTransform;

pub struct Field<S: DrawingSurface> {
    surface: S,
    /// Robots, walls, etc., in insertion order
    elements: Vec<Box<dyn FieldElement>>,
    rows: u32,
    cols: u32,
    cell_size: f64,
    margin: f64,
    width: f64,
    height: f64,
    /// Static objects always use the y-up field convention
    transform: FieldTransform,
}

impl<S: DrawingSurface> Field<S> {
    /// Size the surface, draw the grid, and load the configured background
    /// image and static objects. One grid cell is one foot.
    pub fn new(config: &Config, mut surface: S) -> Self {
        let cols = config.field.w;
        let rows = config.field.h;
        let cell_size = config.field.px_per_ft;
        let margin = config.margin;

        let width = 2.0 * margin + cell_size * cols as f64;
        let height = 2.0 * margin + cell_size * rows as f64;
        surface.set_size(width, height);

        let mut field = Field {
            surface,
            elements: Vec::new(),
            rows,
            cols,
            cell_size,
            margin,
            width,
            height,
            transform: FieldTransform::new(config).with_axis(Axis::YUp),
        };

        log::info!(
            "field {}x{} ft at {} px/ft, surface {}x{} px",
            cols,
            rows,
            cell_size,
            width,
            height
        );

        field.draw_field();
        field.load_field_elements(config);
        field
    }

    fn load_field_elements(&mut self, config: &Config) {
        if let Some(path) = &config.field.image {
            if path.exists() {
                let center = Point2::new(self.width / 2.0, self.height / 2.0);
                self.surface.create_image(center, path);
            } else {
                log::warn!("field image {} does not exist, skipping", path.display());
            }
        }

        for obj in &config.field.objects {
            let points: Vec<Point2<f64>> = obj
                .shape
                .points()
                .into_iter()
                .map(|[x, y]| self.transform.to_drawing_rounded(Point2::new(x, y)))
                .collect();
            log::debug!("field object {} with {} points", obj.color, points.len());
            self.add_moving_element(Box::new(DrawableElement::new(points, None, obj.color)));
        }
    }

    /// Add an element and draw it on the surface.
    pub fn add_moving_element(&mut self, mut element: Box<dyn FieldElement>) {
        element.attach(&mut self.surface);
        self.elements.push(element);
    }

    /// Per-frame entry point: ask every element to update itself, in
    /// insertion order. Elements do not interact.
    pub fn update_widgets(&mut self) -> Result<(), FieldError> {
        for element in &mut self.elements {
            element.perform_move(&mut self.surface)?;
        }
        Ok(())
    }

    fn draw_field(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                self.draw_board_cell(row, col);
            }
        }
    }

    fn draw_board_cell(&mut self, row: u32, col: u32) {
        let left = self.margin + col as f64 * self.cell_size;
        let right = left + self.cell_size;
        let top = self.margin + row as f64 * self.cell_size;
        let bottom = top + self.cell_size;
        self.surface.create_rectangle(
            Point2::new(left, top),
            Point2::new(right, bottom),
            Color::LIGHT_GRAY,
            Color::WHITE,
        );
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Surface size in pixels, (width, height).
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
