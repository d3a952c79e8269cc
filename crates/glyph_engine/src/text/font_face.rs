//! Font face access
//!
//! Wraps a TrueType/OpenType file for the two things the glyph pipeline needs
//! from it: canonical glyph names (from the `post` table, via `read-fonts`)
//! and coverage bitmaps at a fixed pixel size (via `fontdue`).

use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings, Metrics};
use read_fonts::{types::GlyphId16, TableProvider};
use thiserror::Error;

/// Errors that can occur while opening a font
#[derive(Debug, Error)]
pub enum FontError {
    /// Font file could not be read
    #[error("Failed to read font {path}: {source}")]
    Open {
        /// Font path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Font data was rejected by the parser or rasterizer
    #[error("Failed to initialize font: {0}")]
    Init(String),
}

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Single-channel coverage bitmap of one glyph
///
/// Edges are in pixels relative to the glyph origin, y up: the bitmap covers
/// `left..left + width` horizontally and `top - height..top` vertically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedGlyph {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels (rows)
    pub height: u32,
    /// Row-major coverage, first row at the top
    pub coverage: Vec<u8>,
}

impl RasterizedGlyph {
    /// Convert fontdue's bottom-left bitmap metrics to top-left edges
    ///
    /// `None` if the coverage buffer does not match the metrics.
    pub fn from_fontdue(metrics: &Metrics, coverage: Vec<u8>) -> Option<Self> {
        if coverage.len() != metrics.width * metrics.height {
            return None;
        }
        let height = i32::try_from(metrics.height).ok()?;
        Some(Self {
            left: metrics.xmin,
            top: metrics.ymin + height,
            width: u32::try_from(metrics.width).ok()?,
            height: u32::try_from(metrics.height).ok()?,
            coverage,
        })
    }

    /// Right edge
    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    /// Bottom edge
    pub fn bottom(&self) -> i32 {
        self.top - self.height as i32
    }
}

/// Glyph id → canonical glyph name
pub trait GlyphNaming {
    /// Name of a glyph, `None` if the font does not name it
    fn glyph_name(&self, glyph_id: u32) -> Option<&str>;
}

/// Everything the atlas builder needs from a font
pub trait GlyphSource: GlyphNaming {
    /// Number of glyphs in the font
    fn glyph_count(&self) -> u32;

    /// Rasterize a glyph at the source's pixel size; `None` on failure
    fn rasterize(&self, glyph_id: u32) -> Option<RasterizedGlyph>;
}

/// A font opened at a fixed pixel size
pub struct FontFace {
    bytes: Arc<Vec<u8>>,
    font: Font,
    names: Vec<Option<String>>,
    units_per_em: u16,
    pixel_size: f32,
}

impl FontFace {
    /// Parse font bytes and resolve every glyph name up front
    pub fn from_bytes(bytes: Vec<u8>, pixel_size: f32) -> FontResult<Self> {
        let font = Font::from_bytes(bytes.as_slice(), FontSettings::default())
            .map_err(|e| FontError::Init(format!("fontdue error: {}", e)))?;

        let font_ref = read_fonts::FontRef::new(&bytes)
            .map_err(|e| FontError::Init(format!("font table error: {}", e)))?;
        let units_per_em = font_ref
            .head()
            .map_err(|e| FontError::Init(format!("missing head table: {}", e)))?
            .units_per_em();
        if units_per_em == 0 {
            return Err(FontError::Init("units per em is zero".to_string()));
        }

        let glyph_count = font.glyph_count();
        let names = match font_ref.post() {
            Ok(post) => (0..glyph_count)
                .map(|id| {
                    post.glyph_name(GlyphId16::new(id))
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                })
                .collect(),
            Err(e) => {
                log::warn!("Font has no usable post table ({}); glyphs are unnamed", e);
                vec![None; glyph_count as usize]
            }
        };

        log::info!(
            "Loaded font: {} glyphs, {} units/em, {}px",
            glyph_count,
            units_per_em,
            pixel_size
        );

        Ok(Self {
            bytes: Arc::new(bytes),
            font,
            names,
            units_per_em,
            pixel_size,
        })
    }

    /// Read and parse a font file
    pub fn open<P: AsRef<Path>>(path: P, pixel_size: f32) -> FontResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(bytes, pixel_size)
    }

    /// Raw font file bytes, shared with the shaping engine
    pub fn bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    /// Design units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Rasterization size in pixels
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    /// Number of glyphs that have a name
    pub fn named_glyph_count(&self) -> usize {
        self.names.iter().filter(|n| n.is_some()).count()
    }
}

impl GlyphNaming for FontFace {
    fn glyph_name(&self, glyph_id: u32) -> Option<&str> {
        self.names.get(glyph_id as usize)?.as_deref()
    }
}

impl GlyphSource for FontFace {
    fn glyph_count(&self) -> u32 {
        u32::from(self.font.glyph_count())
    }

    fn rasterize(&self, glyph_id: u32) -> Option<RasterizedGlyph> {
        let index = u16::try_from(glyph_id).ok()?;
        if index >= self.font.glyph_count() {
            return None;
        }

        let (metrics, coverage) = self.font.rasterize_indexed(index, self.pixel_size);
        RasterizedGlyph::from_fontdue(&metrics, coverage)
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("glyph_count", &self.font.glyph_count())
            .field("units_per_em", &self.units_per_em)
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_edges() {
        let glyph = RasterizedGlyph { left: -2, top: 20, width: 10, height: 25, coverage: vec![0; 250] };
        assert_eq!(glyph.right(), 8);
        assert_eq!(glyph.bottom(), -5);
    }

    #[test]
    fn test_fontdue_metrics_to_edges() {
        // Descender: bitmap from y = -4 up to y = 8
        let metrics = Metrics { xmin: 1, ymin: -4, width: 3, height: 12, ..Default::default() };
        let glyph = RasterizedGlyph::from_fontdue(&metrics, vec![255; 36]).unwrap();
        assert_eq!((glyph.left, glyph.top), (1, 8));
        assert_eq!((glyph.right(), glyph.bottom()), (4, -4));
        assert_eq!((glyph.width, glyph.height), (3, 12));
    }

    #[test]
    fn test_fontdue_blank_glyph() {
        let metrics = Metrics { xmin: 0, ymin: 0, width: 0, height: 0, ..Default::default() };
        let glyph = RasterizedGlyph::from_fontdue(&metrics, Vec::new()).unwrap();
        assert_eq!((glyph.top, glyph.bottom()), (0, 0));
        assert!(glyph.coverage.is_empty());
    }

    #[test]
    fn test_fontdue_coverage_length_mismatch() {
        let metrics = Metrics { xmin: 0, ymin: 0, width: 2, height: 2, ..Default::default() };
        assert_eq!(RasterizedGlyph::from_fontdue(&metrics, vec![0; 3]), None);
    }

    #[test]
    fn test_garbage_font_is_init_error() {
        let err = FontFace::from_bytes(vec![0, 1, 2, 3], 32.0).unwrap_err();
        assert!(matches!(err, FontError::Init(_)));
    }

    #[test]
    fn test_missing_font_file() {
        let err = FontFace::open("resources/fonts/does-not-exist.ttf", 32.0).unwrap_err();
        assert!(matches!(err, FontError::Open { .. }));
    }
}
