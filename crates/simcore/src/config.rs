//! Simulation configuration.
//!
//! The file on disk holds one sub-configuration per simulation type plus a
//! selector. `SimConfig::resolve` picks the selected entry, validates it,
//! and hands back a `Config` whose fields are used directly everywhere
//! else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sim_type `{0}` has no matching entry in sim_types")]
    UnknownSimType(String),
    #[error("invalid configuration: {0}")]
    InvalidField(String),
}

/// Vertical axis convention of the real-world coordinates a simulation
/// type reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// y increases upward from the bottom edge of the field; flipped when drawn.
    #[default]
    YUp,
    /// y increases downward from the top edge, same as the drawing surface.
    YDown,
}

/// Outline of a static field object, in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectShape {
    /// `[x, y, w, h]` with (x, y) the bottom-left corner
    Rect { rect: [f64; 4] },
    Points { points: Vec<[f64; 2]> },
}

impl ObjectShape {
    /// Corner list of the shape. Rectangles expand to
    /// (x, y+h), (x+w, y+h), (x+w, y), (x, y).
    pub fn points(&self) -> Vec<[f64; 2]> {
        match self {
            ObjectShape::Rect { rect: [x, y, w, h] } => vec![
                [*x, y + h],
                [x + w, y + h],
                [x + w, *y],
                [*x, *y],
            ],
            ObjectShape::Points { points } => points.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldObjectConfig {
    pub color: Color,
    #[serde(flatten)]
    pub shape: ObjectShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field width in feet (grid columns)
    pub w: u32,
    /// Field height in feet (grid rows)
    pub h: u32,
    pub px_per_ft: f64,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub objects: Vec<FieldObjectConfig>,
}

fn default_peripheral_color() -> Color {
    Color::GRAY
}

/// A named sub-element attached to the robot. Points and center are
/// absolute real-world coordinates at the starting pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeripheralConfig {
    pub name: String,
    pub center: [f64; 2],
    pub points: Vec<[f64; 2]>,
    #[serde(default = "default_peripheral_color")]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Robot width in feet
    pub w: f64,
    /// Robot length in feet
    pub l: f64,
    pub starting_x: f64,
    pub starting_y: f64,
    /// Starting heading in degrees
    #[serde(default)]
    pub starting_angle: f64,
    #[serde(default)]
    pub objects: Vec<PeripheralConfig>,
}

impl RobotConfig {
    pub fn starting_heading(&self) -> f64 {
        self.starting_angle.to_radians()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimTypeConfig {
    #[serde(default)]
    pub axis: Axis,
    pub field: FieldConfig,
    pub robot: RobotConfig,
}

/// Configuration file as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub sim_type: String,
    pub field_drawing_margin: f64,
    pub sim_types: HashMap<String, SimTypeConfig>,
}

/// Configuration for the selected simulation type.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sim_type: String,
    /// Drawing margin in pixels
    pub margin: f64,
    pub axis: Axis,
    pub field: FieldConfig,
    pub robot: RobotConfig,
}

impl SimConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_json(&text)
    }

    /// Select the configured simulation type and validate it.
    pub fn resolve(mut self) -> Result<Config, ConfigError> {
        let selected = self
            .sim_types
            .remove(&self.sim_type)
            .ok_or_else(|| ConfigError::UnknownSimType(self.sim_type.clone()))?;

        let config = Config {
            sim_type: self.sim_type,
            margin: self.field_drawing_margin,
            axis: selected.axis,
            field: selected.field,
            robot: selected.robot,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        SimConfig::load(path)?.resolve()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::InvalidField(msg));

        if !(self.field.px_per_ft > 0.0) {
            return invalid(format!("field.px_per_ft must be positive, got {}", self.field.px_per_ft));
        }
        if self.field.w == 0 || self.field.h == 0 {
            return invalid(format!("field must be at least 1x1 ft, got {}x{}", self.field.w, self.field.h));
        }
        if self.margin < 0.0 {
            return invalid(format!("field_drawing_margin must not be negative, got {}", self.margin));
        }
        if !(self.robot.w > 0.0 && self.robot.l > 0.0) {
            return invalid(format!("robot dimensions must be positive, got {}x{}", self.robot.w, self.robot.l));
        }
        for (i, obj) in self.field.objects.iter().enumerate() {
            if obj.shape.points().len() < 3 {
                return invalid(format!("field object {i} needs at least 3 points"));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for p in &self.robot.objects {
            if p.points.len() < 3 {
                return invalid(format!("peripheral `{}` needs at least 3 points", p.name));
            }
            if !seen.insert(p.name.as_str()) {
                return invalid(format!("peripheral `{}` is defined twice", p.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "sim_type": "profile",
        "field_drawing_margin": 20,
        "sim_types": {
            "profile": {
                "axis": "y_up",
                "field": {
                    "w": 54, "h": 27, "px_per_ft": 10,
                    "objects": [
                        { "color": "blue", "rect": [1, 2, 3, 4] },
                        { "color": "#ccc", "points": [[0, 0], [1, 0], [1, 1]] }
                    ]
                },
                "robot": {
                    "w": 2, "l": 3,
                    "starting_x": 10, "starting_y": 5, "starting_angle": 90,
                    "objects": [
                        { "name": "arm", "center": [10, 6], "points": [[9.5, 6], [10.5, 6], [10, 7]] }
                    ]
                }
            },
            "tankdrive": {
                "axis": "y_down",
                "field": { "w": 10, "h": 10, "px_per_ft": 5 },
                "robot": { "w": 1, "l": 1, "starting_x": 1, "starting_y": 1 }
            }
        }
    }"##;

    #[test]
    fn test_resolve_selected_sim_type() {
        let config = SimConfig::from_json(SAMPLE).unwrap().resolve().unwrap();
        assert_eq!(config.sim_type, "profile");
        assert_eq!(config.axis, Axis::YUp);
        assert_eq!(config.margin, 20.0);
        assert_eq!((config.field.w, config.field.h), (54, 27));
        assert_eq!(config.field.objects.len(), 2);
        assert_eq!(config.field.objects[1].color, Color::LIGHT_GRAY);
        assert!((config.robot.starting_heading() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let arm = &config.robot.objects[0];
        assert_eq!(arm.name, "arm");
        assert_eq!(arm.color, Color::GRAY);
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let mut raw = SimConfig::from_json(SAMPLE).unwrap();
        raw.sim_type = "tankdrive".to_owned();
        let config = raw.resolve().unwrap();
        assert_eq!(config.axis, Axis::YDown);
        assert!(config.field.objects.is_empty());
        assert!(config.field.image.is_none());
        assert!(config.robot.objects.is_empty());
        assert_eq!(config.robot.starting_angle, 0.0);
    }

    #[test]
    fn test_rect_expands_to_four_corners() {
        let shape = ObjectShape::Rect { rect: [1.0, 2.0, 3.0, 4.0] };
        assert_eq!(
            shape.points(),
            vec![[1.0, 6.0], [4.0, 6.0], [4.0, 2.0], [1.0, 2.0]]
        );
    }

    #[test]
    fn test_unknown_sim_type_fails() {
        let mut raw = SimConfig::from_json(SAMPLE).unwrap();
        raw.sim_type = "missing".to_owned();
        assert!(matches!(raw.resolve(), Err(ConfigError::UnknownSimType(name)) if name == "missing"));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let mut raw = SimConfig::from_json(SAMPLE).unwrap();
        if let Some(sim) = raw.sim_types.get_mut("profile") {
            sim.field.px_per_ft = 0.0;
        }
        assert!(matches!(raw.resolve(), Err(ConfigError::InvalidField(_))));
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let text = r#"{ "sim_type": "a", "sim_types": {} }"#;
        assert!(matches!(SimConfig::from_json(text), Err(ConfigError::Parse(_))));
    }
}
