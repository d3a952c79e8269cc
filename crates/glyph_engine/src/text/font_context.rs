//! Loaded font state
//!
//! Everything the runtime needs to shape and place text: the font face, its
//! shaping engine and the joined glyph assets. Built once at startup and passed
//! by reference; nothing here is mutated after [`FontContext::load`].

use thiserror::Error;

use super::font_face::{FontError, FontFace};
use super::shaper::{HarfShapingEngine, TextShaper};
use super::TextError;
use crate::assets::{GlyphAssets, IndexError, MeshIndex, TextureIndex};
use crate::config::{ConfigError, FontConfig};
use crate::render::TextureUploader;

/// Errors that prevent a font context from being created
#[derive(Debug, Error)]
pub enum FontContextError {
    /// Configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Font could not be opened
    #[error(transparent)]
    Font(#[from] FontError),

    /// Shaping engine could not be initialized
    #[error("Failed to initialize shaping engine: {0}")]
    Engine(TextError),

    /// A baked asset failed to load
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Font face, shaping engine and glyph assets for one font
pub struct FontContext {
    face: FontFace,
    engine: HarfShapingEngine,
    assets: GlyphAssets,
    pixel_scale: f32,
}

impl FontContext {
    /// Open the font and load both baked assets, uploading glyph textures
    pub fn load(config: &FontConfig, uploader: &mut dyn TextureUploader) -> Result<Self, FontContextError> {
        config.validate()?;

        let face = FontFace::open(&config.font_path, config.pixel_size_f32())?;
        let engine =
            HarfShapingEngine::new(face.bytes(), config.pixel_size_f32()).map_err(FontContextError::Engine)?;

        let meshes = MeshIndex::open(&config.geometry_path)?;
        let textures = TextureIndex::open(&config.texture_path, uploader)?;
        let assets = GlyphAssets::new(meshes, &textures);

        log::info!(
            "Font context ready: {} ({} drawable glyphs)",
            config.font_path.display(),
            assets.len()
        );

        Ok(Self {
            face,
            engine,
            assets,
            pixel_scale: config.pixel_scale,
        })
    }

    /// Shaper bound to this context's engine and glyph names
    pub fn shaper(&self) -> TextShaper<'_> {
        TextShaper::new(&self.engine, &self.face, self.pixel_scale)
    }

    /// Joined glyph assets
    pub fn assets(&self) -> &GlyphAssets {
        &self.assets
    }

    /// Font face
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Pixel → world scale shared by baking and shaping
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }
}
