//! Glyph atlas builder
//!
//! Offline half of the text pipeline. Every named glyph of a font becomes one
//! textured quad in a shared vertex buffer plus one coverage bitmap in a shared
//! byte buffer, both keyed by glyph name. The result is written as two assets:
//!
//! - geometry (`.pnct`): `pnct`, `str0`, `idx0`
//! - texture (`.txtr`): `txtr`, `str0`, `idx1`
//!
//! A glyph that cannot be named or rasterized is skipped and reported; only
//! file and font errors abort a build.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use super::font_face::{GlyphSource, RasterizedGlyph};
use crate::assets::chunk::{write_chunk, ChunkError, IDX0, IDX1, PNCT, STR0, TXTR};
use crate::assets::glyph_records::{GeometryIndexEntry, GlyphVertex, TextureIndexEntry};
use crate::assets::{AssetError, ImageData};

/// Errors that abort a build or its output
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Output file could not be created
    #[error("Failed to create {path}: {source}")]
    Create {
        /// Output path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Writing a chunk failed
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// A shared buffer outgrew the u32 offsets of the index records
    #[error("{0} buffer exceeds u32 offsets")]
    TooLarge(&'static str),
}

/// Why a glyph was left out of the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Font has no name for the glyph
    NoName,
    /// Rasterizer failed
    RasterFailed,
    /// An earlier glyph already used the name
    DuplicateName,
}

/// A glyph that was not emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGlyph {
    /// Glyph id in the font
    pub glyph_id: u32,
    /// Name, when one was found
    pub name: Option<String>,
    /// Reason for skipping
    pub reason: SkipReason,
}

/// Summary of one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Glyphs the font reports
    pub total_glyphs: u32,
    /// Glyphs written to both assets
    pub emitted: usize,
    /// Glyphs left out, in glyph id order
    pub skipped: Vec<SkippedGlyph>,
}

impl BuildReport {
    /// Number of skipped glyphs with a given reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Quad covering a glyph bitmap, as two counter-clockwise triangles (y up)
///
/// UV `(0,0)` maps to the bitmap's top-left and `(1,1)` to its bottom-right.
pub fn glyph_quad(glyph: &RasterizedGlyph, pixel_scale: f32) -> [GlyphVertex; 6] {
    let left = glyph.left as f32 * pixel_scale;
    let right = glyph.right() as f32 * pixel_scale;
    let top = glyph.top as f32 * pixel_scale;
    let bottom = glyph.bottom() as f32 * pixel_scale;

    let bottom_left = GlyphVertex::new([left, bottom, 0.0], [0.0, 1.0]);
    let bottom_right = GlyphVertex::new([right, bottom, 0.0], [1.0, 1.0]);
    let top_right = GlyphVertex::new([right, top, 0.0], [1.0, 0.0]);
    let top_left = GlyphVertex::new([left, top, 0.0], [0.0, 0.0]);

    [bottom_left, bottom_right, top_right, bottom_left, top_right, top_left]
}

fn offset(len: usize, what: &'static str) -> Result<u32, AtlasError> {
    u32::try_from(len).map_err(|_| AtlasError::TooLarge(what))
}

/// Baked glyph tables, ready to be written
#[derive(Debug, Clone, Default)]
pub struct GlyphAtlas {
    vertices: Vec<GlyphVertex>,
    coverage: Vec<u8>,
    names: Vec<u8>,
    geometry_index: Vec<GeometryIndexEntry>,
    texture_index: Vec<TextureIndexEntry>,
    report: BuildReport,
}

impl GlyphAtlas {
    /// Write the geometry asset: `pnct`, `str0`, `idx0`
    pub fn write_geometry<W: Write>(&self, writer: &mut W) -> Result<(), ChunkError> {
        write_chunk(writer, &PNCT, &self.vertices)?;
        write_chunk(writer, &STR0, &self.names)?;
        write_chunk(writer, &IDX0, &self.geometry_index)
    }

    /// Write the texture asset: `txtr`, `str0`, `idx1`
    pub fn write_texture<W: Write>(&self, writer: &mut W) -> Result<(), ChunkError> {
        write_chunk(writer, &TXTR, &self.coverage)?;
        write_chunk(writer, &STR0, &self.names)?;
        write_chunk(writer, &IDX1, &self.texture_index)
    }

    /// Write both assets to disk
    pub fn write_files<P: AsRef<Path>, Q: AsRef<Path>>(&self, geometry_path: P, texture_path: Q) -> Result<(), AtlasError> {
        let mut geometry = create_output(geometry_path.as_ref())?;
        self.write_geometry(&mut geometry)?;
        geometry.flush().map_err(ChunkError::Io)?;

        let mut texture = create_output(texture_path.as_ref())?;
        self.write_texture(&mut texture)?;
        texture.flush().map_err(ChunkError::Io)?;

        log::info!(
            "Wrote {} and {}",
            geometry_path.as_ref().display(),
            texture_path.as_ref().display()
        );
        Ok(())
    }

    /// Build summary
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Emitted glyph names in emission order
    pub fn glyph_names(&self) -> impl Iterator<Item = &str> {
        self.geometry_index.iter().filter_map(|entry| {
            std::str::from_utf8(&self.names[entry.name_begin as usize..entry.name_end as usize]).ok()
        })
    }

    /// Number of emitted glyphs
    pub fn len(&self) -> usize {
        self.geometry_index.len()
    }

    /// True when nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.geometry_index.is_empty()
    }

    /// Shared vertex buffer
    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    /// Every emitted glyph's name and RGBA image, in emission order
    pub fn glyph_images(&self) -> impl Iterator<Item = (&str, Result<ImageData, AssetError>)> + '_ {
        self.texture_index.iter().filter_map(|entry| {
            let name = std::str::from_utf8(&self.names[entry.name_begin as usize..entry.name_end as usize]).ok()?;
            let coverage = &self.coverage[entry.tex_begin as usize..entry.tex_end as usize];
            Some((name, ImageData::from_alpha_coverage(entry.width, entry.height, coverage)))
        })
    }

    /// RGBA image of one emitted glyph, for debug export
    pub fn glyph_image(&self, name: &str) -> Option<Result<ImageData, AssetError>> {
        let entry = self.texture_index.iter().find(|entry| {
            &self.names[entry.name_begin as usize..entry.name_end as usize] == name.as_bytes()
        })?;
        let coverage = &self.coverage[entry.tex_begin as usize..entry.tex_end as usize];
        Some(ImageData::from_alpha_coverage(entry.width, entry.height, coverage))
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>, AtlasError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| AtlasError::Create { path: path.display().to_string(), source })
}

/// Bakes a [`GlyphSource`] into a [`GlyphAtlas`]
#[derive(Debug, Clone, Copy)]
pub struct GlyphAtlasBuilder {
    pixel_scale: f32,
}

impl GlyphAtlasBuilder {
    /// Builder converting pixels to world units with `pixel_scale`
    pub fn new(pixel_scale: f32) -> Self {
        Self { pixel_scale }
    }

    /// Pixel → world scale
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Visit glyph ids `0..glyph_count` and emit every named, rasterizable glyph
    pub fn build(&self, source: &dyn GlyphSource) -> Result<GlyphAtlas, AtlasError> {
        let total_glyphs = source.glyph_count();
        let mut atlas = GlyphAtlas::default();
        let mut seen = HashSet::new();

        log::info!("Font provides {} glyphs", total_glyphs);

        for glyph_id in 0..total_glyphs {
            let name = match source.glyph_name(glyph_id) {
                Some(name) if !name.is_empty() => name,
                _ => {
                    log::warn!("Problem getting glyph name for glyph {}", glyph_id);
                    atlas.report.skipped.push(SkippedGlyph { glyph_id, name: None, reason: SkipReason::NoName });
                    continue;
                }
            };

            if seen.contains(name) {
                log::warn!("Glyph {} repeats the name '{}'; keeping the first", glyph_id, name);
                atlas.report.skipped.push(SkippedGlyph {
                    glyph_id,
                    name: Some(name.to_string()),
                    reason: SkipReason::DuplicateName,
                });
                continue;
            }

            let glyph = match source.rasterize(glyph_id) {
                Some(glyph) if glyph.coverage.len() as u64 == u64::from(glyph.width) * u64::from(glyph.height) => glyph,
                _ => {
                    log::warn!("Problem rasterizing glyph {} ('{}')", glyph_id, name);
                    atlas.report.skipped.push(SkippedGlyph {
                        glyph_id,
                        name: Some(name.to_string()),
                        reason: SkipReason::RasterFailed,
                    });
                    continue;
                }
            };

            self.emit(&mut atlas, name, &glyph)?;
            seen.insert(name.to_string());
        }

        atlas.report.total_glyphs = total_glyphs;
        atlas.report.emitted = atlas.len();
        log::info!(
            "{} glyphs recognized under {}",
            atlas.report.emitted,
            total_glyphs
        );
        Ok(atlas)
    }

    fn emit(&self, atlas: &mut GlyphAtlas, name: &str, glyph: &RasterizedGlyph) -> Result<(), AtlasError> {
        let name_begin = offset(atlas.names.len(), "name")?;
        let name_end = offset(atlas.names.len() + name.len(), "name")?;
        let vertex_begin = offset(atlas.vertices.len(), "vertex")?;
        let vertex_end = offset(atlas.vertices.len() + 6, "vertex")?;
        let tex_begin = offset(atlas.coverage.len(), "texture")?;
        let tex_end = offset(atlas.coverage.len() + glyph.coverage.len(), "texture")?;

        atlas.vertices.extend_from_slice(&glyph_quad(glyph, self.pixel_scale));
        atlas.coverage.extend_from_slice(&glyph.coverage);
        atlas.names.extend_from_slice(name.as_bytes());

        atlas.geometry_index.push(GeometryIndexEntry { name_begin, name_end, vertex_begin, vertex_end });
        atlas.texture_index.push(TextureIndexEntry {
            name_begin,
            name_end,
            tex_begin,
            tex_end,
            width: glyph.width,
            height: glyph.height,
        });
        Ok(())
    }
}
