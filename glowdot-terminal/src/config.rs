//! Viewer settings loaded from TOML

use std::path::Path;

use glowdot_core::dot_cloud::{DEFAULT_BUFF_RATIO, DEFAULT_GLOW_DOT_RADIUS, DEFAULT_GRID_HEIGHT};
use glowdot_core::{BlinkType, CameraFrame, DotCloud, DotStyle, EulerAngles, FRAME_HEIGHT};
use nalgebra::{Point3, Vector4};
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value outside its accepted range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Grid of glow dots and the initial camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub rows: usize,
    pub cols: usize,
    pub layers: usize,
    pub radius: f32,
    pub buff_ratio: f32,
    pub grid_height: f32,

    pub glow_factor: f32,
    pub quad_factor: f32,
    pub anti_alias_width: f32,
    pub dynamic_color: f32,
    pub blink_factor: f32,
    pub blink_type: BlinkType,
    /// RGBA stops spread across the grid as a gradient
    pub colors: Vec<[f32; 4]>,

    pub frame_height: f32,
    /// Initial camera angles in degrees
    pub theta: f32,
    pub phi: f32,
    pub gamma: f32,
    /// Automatic orbit in degrees per frame
    pub orbit_speed: f32,
    pub target_fps: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            layers: 3,
            radius: DEFAULT_GLOW_DOT_RADIUS,
            buff_ratio: DEFAULT_BUFF_RATIO,
            grid_height: DEFAULT_GRID_HEIGHT,
            glow_factor: 2.0,
            quad_factor: 0.0,
            anti_alias_width: 0.5,
            dynamic_color: 0.0,
            blink_factor: 0.0,
            blink_type: BlinkType::Brightness,
            colors: vec![[1.0, 1.0, 0.0, 1.0]],
            frame_height: FRAME_HEIGHT,
            theta: -30.0,
            phi: 70.0,
            gamma: 0.0,
            orbit_speed: 0.5,
            target_fps: 30,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&contents)?;
        log::info!("loaded viewer config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 || self.layers == 0 {
            return Err(ConfigError::Invalid {
                field: "rows/cols/layers",
                reason: "grid dimensions must be at least 1".to_string(),
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "radius",
                reason: format!("{} is not a positive number", self.radius),
            });
        }
        if !(self.frame_height.is_finite() && self.frame_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "frame_height",
                reason: format!("{} is not a positive number", self.frame_height),
            });
        }
        if self.colors.is_empty() {
            return Err(ConfigError::Invalid {
                field: "colors",
                reason: "at least one color is required".to_string(),
            });
        }
        if let Some(color) = self.colors.iter().find(|c| c.iter().any(|v| !(0.0..=1.0).contains(v))) {
            return Err(ConfigError::Invalid {
                field: "colors",
                reason: format!("{color:?} has a channel outside [0, 1]"),
            });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid {
                field: "target_fps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn dot_style(&self) -> DotStyle {
        let mut style = DotStyle::glow();
        style.set_glow_factor(self.glow_factor);
        style.set_quad_factor(self.quad_factor);
        style.set_anti_alias_width(self.anti_alias_width);
        style.set_dynamic_color(self.dynamic_color);
        style.set_blink_factor(self.blink_factor);
        style.set_blink_type(self.blink_type);
        style
    }

    pub fn dot_cloud(&self) -> DotCloud {
        let mut cloud = DotCloud::new(vec![Point3::origin()], self.radius).with_style(self.dot_style());
        cloud.to_grid(self.rows, self.cols, self.layers, self.buff_ratio, Some(self.grid_height));
        let colors: Vec<_> = self.colors.iter().map(|c| Vector4::from(*c)).collect();
        cloud.set_colors(&colors);
        cloud
    }

    pub fn camera_frame(&self) -> CameraFrame {
        let mut frame = CameraFrame::new();
        frame.set_height(self.frame_height);
        frame.set_euler_angles(EulerAngles::new(
            self.theta.to_radians(),
            self.phi.to_radians().clamp(0.0, std::f32::consts::PI),
            self.gamma.to_radians(),
        ));
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ViewerConfig::from_toml("rows = 2\nquad_factor = 1.0\nblink_type = \"hue\"\n").unwrap();
        assert_eq!(config.rows, 2);
        assert_eq!(config.cols, ViewerConfig::default().cols);
        assert_eq!(config.blink_type, BlinkType::Hue);
        assert_eq!(config.dot_style().quad_factor(), 1.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ViewerConfig::from_toml("radius = -1.0"),
            Err(ConfigError::Invalid { field: "radius", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_toml("layers = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(ViewerConfig::from_toml("rows = \"many\""), Err(ConfigError::Parse(_))));
        assert!(matches!(
            ViewerConfig::from_toml("colors = [[1.0, 2.0, 0.0, 1.0]]"),
            Err(ConfigError::Invalid { field: "colors", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_toml("colors = []"),
            Err(ConfigError::Invalid { field: "colors", .. })
        ));
    }

    #[test]
    fn test_style_and_colors_from_toml() {
        let contents = "blink_factor = 0.5\ndynamic_color = 2.0\nanti_alias_width = 0.0\n\
                    cols = 3\nrows = 1\nlayers = 1\ncolors = [[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]\n";
        let config = ViewerConfig::from_toml(contents).unwrap();
        let style = config.dot_style();
        assert_eq!(style.blink_factor(), 0.5);
        assert_eq!(style.dynamic_color(), 1.0);
        assert_eq!(style.anti_alias_width(), 0.0);

        let cloud = config.dot_cloud();
        assert_eq!(cloud.colors().len(), 3);
        assert_relative_eq!(cloud.colors()[0], Vector4::new(1.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(cloud.colors()[1], Vector4::new(0.5, 0.0, 0.5, 1.0), epsilon = 1e-6);
        assert_relative_eq!(cloud.colors()[2], Vector4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::load_from_file("/nonexistent/glowdot.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_scene_from_config() {
        let config = ViewerConfig {
            rows: 2,
            cols: 2,
            layers: 2,
            ..ViewerConfig::default()
        };
        let cloud = config.dot_cloud();
        assert_eq!(cloud.len(), 8);
        assert_relative_eq!(cloud.bounding_box().unwrap().size().y, config.grid_height, epsilon = 1e-5);

        let frame = config.camera_frame();
        assert_relative_eq!(frame.euler.phi, 70f32.to_radians());
        assert_relative_eq!(frame.height, FRAME_HEIGHT);
    }
}
