//! Text system
//!
//! Offline glyph baking and runtime text placement.
//!
//! - [`font_face`]: font file access (glyph names, rasterization)
//! - [`atlas_builder`]: bakes every named glyph into the geometry and texture assets
//! - [`shaper`]: shapes UTF-8 into named glyphs at world-space pen offsets
//! - [`line_compositor`]: turns shaped text into erasable lines of scene nodes
//! - [`font_context`]: the loaded font, engine and assets, passed by reference

pub mod font_face;
pub mod atlas_builder;
pub mod shaper;
pub mod line_compositor;
pub mod font_context;

pub use font_face::{FontError, FontFace, GlyphNaming, GlyphSource, RasterizedGlyph};
pub use atlas_builder::{AtlasError, BuildReport, GlyphAtlas, GlyphAtlasBuilder, SkipReason, SkippedGlyph};
pub use shaper::{units_to_subpixels, HarfShapingEngine, RawGlyph, ShapedGlyph, ShapingEngine, TextShaper};
pub use line_compositor::{LineCompositor, LineHandle, TextLine};
pub use font_context::{FontContext, FontContextError};

use thiserror::Error;

/// Errors raised while shaping or placing text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    /// Shaped output names a glyph the loaded assets do not contain
    #[error("glyph '{0}' is not in the loaded glyph assets")]
    MissingGlyph(String),

    /// The font has no name for a glyph id the shaper produced
    #[error("shaped glyph id {0} has no name in the font")]
    UnnamedGlyph(u32),

    /// The shaping engine could not run
    #[error("shaping failed: {0}")]
    Shaping(String),
}
