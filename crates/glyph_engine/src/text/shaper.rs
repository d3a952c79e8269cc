//! Text shaping
//!
//! Converts a UTF-8 string into an ordered list of named glyphs placed at
//! world-space pen offsets. A line is exactly one shaping call; there is no
//! wrapping.
//!
//! # Layout Coordinate System
//!
//! - Origin (0, 0) is the pen start on the baseline
//! - +X points right, +Y points up
//! - Engine positions are in 1/64 pixel; world = value × `pixel_scale` / 64

use std::sync::Arc;

use read_fonts::TableProvider;

use super::font_face::GlyphNaming;
use super::TextError;
use crate::foundation::math::Vec2;

/// One glyph as reported by a shaping engine, in 1/64 pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawGlyph {
    /// Glyph id in the font
    pub glyph_id: u32,
    /// Horizontal pen advance
    pub x_advance: i32,
    /// Vertical pen advance
    pub y_advance: i32,
    /// Horizontal offset from the pen
    pub x_offset: i32,
    /// Vertical offset from the pen
    pub y_offset: i32,
}

/// Complex-text shaping service
pub trait ShapingEngine {
    /// Shape `text` into glyphs in visual output order
    fn shape(&self, text: &str) -> Result<Vec<RawGlyph>, TextError>;
}

/// `harfrust` shaping against a font at a fixed pixel size
pub struct HarfShapingEngine {
    bytes: Arc<Vec<u8>>,
    data: harfrust::ShaperData,
    units_per_em: u16,
    pixel_size: f32,
}

impl HarfShapingEngine {
    /// Prepare shaping data for the face in `bytes`
    pub fn new(bytes: Arc<Vec<u8>>, pixel_size: f32) -> Result<Self, TextError> {
        let units_per_em = read_fonts::FontRef::from_index(bytes.as_slice(), 0)
            .and_then(|font| font.head())
            .map_err(|e| TextError::Shaping(e.to_string()))?
            .units_per_em();
        if units_per_em == 0 {
            return Err(TextError::Shaping("units per em is zero".to_string()));
        }
        let font_ref = harfrust::FontRef::from_index(bytes.as_slice(), 0)
            .map_err(|e| TextError::Shaping(e.to_string()))?;
        let data = harfrust::ShaperData::new(&font_ref);

        Ok(Self { bytes, data, units_per_em, pixel_size })
    }

    fn to_subpixels(&self, units: i32) -> i32 {
        units_to_subpixels(units, self.pixel_size, self.units_per_em)
    }
}

/// Font design units → 1/64 pixel at `pixel_size`, rounded to nearest
pub fn units_to_subpixels(units: i32, pixel_size: f32, units_per_em: u16) -> i32 {
    (f64::from(units) * f64::from(pixel_size) * 64.0 / f64::from(units_per_em)).round() as i32
}

impl ShapingEngine for HarfShapingEngine {
    fn shape(&self, text: &str) -> Result<Vec<RawGlyph>, TextError> {
        let font_ref = harfrust::FontRef::from_index(self.bytes.as_slice(), 0)
            .map_err(|e| TextError::Shaping(e.to_string()))?;
        let shaper = self.data.shaper(&font_ref).build();

        let mut buffer = harfrust::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let glyphs = shaper.shape(buffer, &[]);
        let raw = glyphs
            .glyph_infos()
            .iter()
            .zip(glyphs.glyph_positions())
            .map(|(info, pos)| RawGlyph {
                glyph_id: info.glyph_id,
                x_advance: self.to_subpixels(pos.x_advance),
                y_advance: self.to_subpixels(pos.y_advance),
                x_offset: self.to_subpixels(pos.x_offset),
                y_offset: self.to_subpixels(pos.y_offset),
            })
            .collect();
        Ok(raw)
    }
}

/// A named glyph at its position relative to the line origin
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    /// Canonical glyph name, the key into the glyph assets
    pub glyph_name: String,
    /// Pen position plus glyph offset, in world units
    pub position: Vec2,
}

/// Shapes text and resolves glyph names
///
/// Holds no state between calls: shaping the same string twice gives the
/// same result.
#[derive(Clone, Copy)]
pub struct TextShaper<'a> {
    engine: &'a dyn ShapingEngine,
    names: &'a dyn GlyphNaming,
    pixel_scale: f32,
}

impl<'a> TextShaper<'a> {
    /// Shaper over an engine and the naming of the face it shapes with
    pub fn new(engine: &'a dyn ShapingEngine, names: &'a dyn GlyphNaming, pixel_scale: f32) -> Self {
        Self { engine, names, pixel_scale }
    }

    /// Pixel → world scale
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Shape one line of text
    pub fn shape(&self, text: &str) -> Result<Vec<ShapedGlyph>, TextError> {
        let scale = self.pixel_scale / 64.0;
        let mut pen = Vec2::zeros();

        self.engine
            .shape(text)?
            .into_iter()
            .map(|raw| -> Result<ShapedGlyph, TextError> {
                let glyph_name = self
                    .names
                    .glyph_name(raw.glyph_id)
                    .ok_or(TextError::UnnamedGlyph(raw.glyph_id))?
                    .to_string();
                let position = pen + Vec2::new(raw.x_offset as f32, raw.y_offset as f32) * scale;
                pen += Vec2::new(raw.x_advance as f32, raw.y_advance as f32) * scale;
                Ok(ShapedGlyph { glyph_name, position })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Maps each char to a glyph with a fixed advance; `'\u{301}'` becomes a
    /// zero-advance mark offset up and left
    pub(crate) struct FakeEngine {
        pub(crate) ids: HashMap<char, u32>,
        pub(crate) advance: i32,
    }

    impl FakeEngine {
        pub(crate) fn new(chars: &str, advance: i32) -> Self {
            let ids = chars.chars().enumerate().map(|(i, c)| (c, i as u32 + 1)).collect();
            Self { ids, advance }
        }
    }

    impl ShapingEngine for FakeEngine {
        fn shape(&self, text: &str) -> Result<Vec<RawGlyph>, TextError> {
            Ok(text
                .chars()
                .map(|c| {
                    let glyph_id = self.ids.get(&c).copied().unwrap_or(0);
                    if c == '\u{301}' {
                        RawGlyph { glyph_id, x_offset: -self.advance / 2, y_offset: 64, ..Default::default() }
                    } else {
                        RawGlyph { glyph_id, x_advance: self.advance, ..Default::default() }
                    }
                })
                .collect())
        }
    }

    /// Names glyph `id` after its char, glyph 0 stays unnamed
    pub(crate) struct FakeNames(pub(crate) HashMap<u32, String>);

    impl FakeNames {
        pub(crate) fn for_engine(engine: &FakeEngine) -> Self {
            Self(engine.ids.iter().map(|(&c, &id)| (id, c.to_string())).collect())
        }
    }

    impl GlyphNaming for FakeNames {
        fn glyph_name(&self, glyph_id: u32) -> Option<&str> {
            self.0.get(&glyph_id).map(String::as_str)
        }
    }

    #[test]
    fn test_pen_advances_and_scales() {
        let engine = FakeEngine::new("ab", 640);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);

        let glyphs = shaper.shape("abba").unwrap();
        assert_eq!(glyphs.len(), 4);
        assert_eq!(glyphs.iter().map(|g| g.glyph_name.as_str()).collect::<Vec<_>>(), ["a", "b", "b", "a"]);
        // 640 / 64 = 10 px per advance, 0.1 world units
        assert_relative_eq!(glyphs[0].position, Vec2::new(0.0, 0.0));
        assert_relative_eq!(glyphs[3].position, Vec2::new(0.3, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_offset_does_not_move_pen() {
        let engine = FakeEngine::new("e\u{301}x", 128);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 1.0);

        let glyphs = shaper.shape("e\u{301}x").unwrap();
        assert_relative_eq!(glyphs[1].position, Vec2::new(2.0 - 1.0, 1.0));
        assert_relative_eq!(glyphs[2].position, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_shaping_is_deterministic() {
        let engine = FakeEngine::new("ab", 600);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);

        let first = shaper.shape("ab").unwrap();
        let second = shaper.shape("ab").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unnamed_glyph_is_error() {
        let engine = FakeEngine::new("a", 64);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);

        assert_eq!(shaper.shape("a?").unwrap_err(), TextError::UnnamedGlyph(0));
    }

    #[test]
    fn test_units_to_subpixels() {
        // 1000 / 2048 em at 200 px is 97.65625 px
        assert_eq!(units_to_subpixels(1000, 200.0, 2048), 6250);
        assert_eq!(units_to_subpixels(-1000, 200.0, 2048), -6250);
        assert_eq!(units_to_subpixels(0, 200.0, 2048), 0);
        // Full em is exactly the pixel size
        assert_eq!(units_to_subpixels(1000, 32.0, 1000), 32 * 64);
        assert_eq!(units_to_subpixels(2048, 200.0, 2048), 200 * 64);
        // 1 unit of a 1000 upem font at 10 px: 0.64 → 1
        assert_eq!(units_to_subpixels(1, 10.0, 1000), 1);
    }

    #[test]
    fn test_subpixels_round_trip_through_pixel_scale() {
        // An advance of one em lands one em of world space further along
        let engine = FakeEngine::new("a", units_to_subpixels(2048, 200.0, 2048));
        let names = FakeNames::for_engine(&engine);
        let glyphs = TextShaper::new(&engine, &names, 0.01).shape("aa").unwrap();
        assert_relative_eq!(glyphs[1].position.x, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_engine_rejects_non_font_bytes() {
        let result = HarfShapingEngine::new(Arc::new(vec![0, 1, 2, 3]), 32.0);
        assert!(matches!(result, Err(TextError::Shaping(_))));
    }

    #[test]
    fn test_empty_text() {
        let engine = FakeEngine::new("a", 64);
        let names = FakeNames::for_engine(&engine);
        assert!(TextShaper::new(&engine, &names, 0.01).shape("").unwrap().is_empty());
    }
}
