//! # Glyph Engine
//!
//! Bakes a font into per-glyph quads and coverage bitmaps, loads the baked
//! assets at runtime and places shaped text into a scene graph as lines of
//! individually erasable glyph nodes.
//!
//! ## Features
//!
//! - **Chunked Assets**: tagged, length-prefixed binary chunks of packed records
//! - **Atlas Baking**: one quad and one bitmap per named glyph
//! - **Shaping**: `harfrust` shaping with pen offsets in world units
//! - **Line Lifecycle**: create and erase lines without touching other scene content
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glyph_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FontConfig::default();
//!     let mut textures = TextureManager::new();
//!     let fonts = FontContext::load(&config, &mut textures)?;
//!
//!     let mut scene = Scene::new();
//!     let mut lines = LineCompositor::new(ProgramHandle(0));
//!     let line = lines.create_line(&fonts.shaper(), fonts.assets(), &mut scene, "Hello")?;
//!     lines.erase_line(&mut scene, line);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;
pub mod text;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, FontConfig},
        foundation::math::{Transform, Vec2, Vec3},
        assets::{GlyphAssets, MeshIndex, TextureIndex},
        render::{TextureHandle, TextureManager, TextureUploader},
        scene::{NodeId, ProgramHandle, Scene, SceneGraph},
        text::{
            FontContext, FontFace, GlyphAtlasBuilder, LineCompositor, LineHandle, TextError,
            TextShaper,
        },
    };
}
