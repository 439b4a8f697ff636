//! Paints a `RecordingSurface` with the egui painter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui;
use field::{RecordingSurface, SurfaceItem};
use nalgebra::Point2;
use simcore::Color;

const POLYGON_OUTLINE: egui::Color32 = egui::Color32::BLACK;

pub fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Textures are loaded on first use and cached by path. A failed load is
/// cached too so it is only reported once.
#[derive(Default)]
pub struct Canvas {
    textures: HashMap<PathBuf, Option<egui::TextureHandle>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, surface: &RecordingSurface) -> egui::Response {
        let (width, height) = surface.size();
        let desired = egui::vec2(width as f32, height as f32);
        let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
        let origin = response.rect.min;
        let to_screen = |p: &Point2<f64>| origin + egui::vec2(p.x as f32, p.y as f32);

        painter.rect_filled(response.rect, 0.0, egui::Color32::WHITE);

        for item in surface.items() {
            match item {
                SurfaceItem::Rectangle { min, max, outline, fill } => {
                    painter.rect(
                        egui::Rect::from_min_max(to_screen(min), to_screen(max)),
                        0.0,
                        color32(*fill),
                        egui::Stroke::new(1.0, color32(*outline)),
                        egui::StrokeKind::Inside,
                    );
                }
                SurfaceItem::Polygon { points, fill } => {
                    if points.len() < 3 {
                        continue;
                    }
                    let pts: Vec<egui::Pos2> = points.iter().map(to_screen).collect();
                    painter.add(egui::Shape::convex_polygon(
                        pts,
                        color32(*fill),
                        egui::Stroke::new(1.0, POLYGON_OUTLINE),
                    ));
                }
                SurfaceItem::Image { center, path } => {
                    if let Some(texture) = self.texture(ui.ctx(), path) {
                        let rect = egui::Rect::from_center_size(to_screen(center), texture.size_vec2());
                        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
                    }
                }
            }
        }

        response
    }

    fn texture(&mut self, ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
        self.textures
            .entry(path.to_path_buf())
            .or_insert_with(|| match load_color_image(path) {
                Ok(image) => {
                    log::info!("loaded field image {} ({}x{})", path.display(), image.size[0], image.size[1]);
                    Some(ctx.load_texture(path.display().to_string(), image, Default::default()))
                }
                Err(e) => {
                    log::warn!("failed to load field image {}: {}", path.display(), e);
                    None
                }
            })
            .clone()
    }
}

fn load_color_image(path: &Path) -> Result<egui::ColorImage, image::ImageError> {
    let img = image::open(path)?.into_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, img.as_flat_samples().as_slice()))
}
