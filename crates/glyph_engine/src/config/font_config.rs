//! Font and glyph asset configuration
//!
//! The baking tool and the runtime read the same values, so the pixel size and
//! the pixel-to-world scale cannot drift apart between the two.

use serde::{Serialize, Deserialize};
use std::path::PathBuf;

use super::{Config, ConfigError};

/// Settings for rasterizing a font and locating its baked assets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// TrueType/OpenType font file
    pub font_path: PathBuf,
    /// Geometry asset (`pnct`, `str0`, `idx0` chunks)
    pub geometry_path: PathBuf,
    /// Texture asset (`txtr`, `str0`, `idx1` chunks)
    pub texture_path: PathBuf,
    /// Em size in pixels used for rasterization and shaping
    pub pixel_size: u32,
    /// World units per pixel
    pub pixel_scale: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("resources/fonts/InknutAntiqua-Regular.ttf"),
            geometry_path: PathBuf::from("dist/InknutAntiqua.pnct"),
            texture_path: PathBuf::from("dist/InknutAntiqua.txtr"),
            pixel_size: 200,
            pixel_scale: 0.01,
        }
    }
}

impl Config for FontConfig {}

impl FontConfig {
    /// Create a configuration for the given font with default sizing
    pub fn new(font_path: impl Into<PathBuf>) -> Self {
        Self {
            font_path: font_path.into(),
            ..Default::default()
        }
    }

    /// Set where the two baked assets are written/read
    pub fn with_asset_paths(
        mut self,
        geometry_path: impl Into<PathBuf>,
        texture_path: impl Into<PathBuf>,
    ) -> Self {
        self.geometry_path = geometry_path.into();
        self.texture_path = texture_path.into();
        self
    }

    /// Set the rasterization size and the pixel-to-world scale
    pub fn with_sizing(mut self, pixel_size: u32, pixel_scale: f32) -> Self {
        self.pixel_size = pixel_size;
        self.pixel_scale = pixel_scale;
        self
    }

    /// Pixel size as the float the rasterizer and shaper expect
    pub fn pixel_size_f32(&self) -> f32 {
        self.pixel_size as f32
    }

    /// Reject sizes that would produce empty or inverted geometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_size == 0 {
            return Err(ConfigError::Invalid("pixel_size must be positive".to_string()));
        }
        if !(self.pixel_scale.is_finite() && self.pixel_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pixel_scale must be a positive finite number, got {}",
                self.pixel_scale
            )));
        }
        Ok(())
    }
}
