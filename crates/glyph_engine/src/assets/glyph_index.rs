//! Glyph texture/mesh index loader
//!
//! Parses the two baked assets into name-keyed tables:
//!
//! - geometry: `pnct` (vertices), `str0` (names), `idx0` (name + vertex range)
//! - texture: `txtr` (coverage bytes), `str0` (names), `idx1` (name + byte range + size)
//!
//! Every index record is validated against the buffers it points into before
//! anything is built from it; a bad record fails the whole load. The resulting
//! [`GlyphAssets`] table is immutable; reloading means building a new one.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

use super::chunk::{read_chunk, ChunkError, IDX0, IDX1, PNCT, STR0, TXTR};
use super::glyph_records::{GeometryIndexEntry, GlyphVertex, NamedEntry, TextureIndexEntry};
use super::ImageData;
use crate::render::{TextureError, TextureHandle, TextureParams, TextureUploader};
use crate::text::TextError;

/// Format errors found while loading a glyph asset
#[derive(Debug, Error)]
pub enum IndexError {
    /// Asset file could not be opened
    #[error("cannot open glyph asset {path}: {source}")]
    Open {
        /// File that failed to open
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Chunk framing is broken
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Name slice lies outside the `str0` table
    #[error("index entry {index} has out-of-range name {begin}..{end} (table is {len} bytes)")]
    NameOutOfRange {
        /// Position of the entry in its index chunk
        index: usize,
        /// Declared name start
        begin: u32,
        /// Declared name end
        end: u32,
        /// Name table length
        len: usize,
    },

    /// Name bytes are not UTF-8
    #[error("index entry {index} has a name that is not valid UTF-8")]
    InvalidName {
        /// Position of the entry in its index chunk
        index: usize,
    },

    /// Data range lies outside its buffer
    #[error("glyph '{name}' has out-of-range {what} {begin}..{end} (buffer holds {len})")]
    RangeOutOfBounds {
        /// Glyph name
        name: String,
        /// "vertices" or "texture bytes"
        what: &'static str,
        /// Declared start
        begin: u32,
        /// Declared end
        end: u32,
        /// Buffer length
        len: usize,
    },

    /// Texture range length disagrees with the bitmap size
    #[error("glyph '{name}' has {len} texture bytes but claims {width}x{height}")]
    DimensionMismatch {
        /// Glyph name
        name: String,
        /// `tex_end - tex_begin`
        len: usize,
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
    },

    /// The same name appears twice in one index
    #[error("glyph name '{0}' appears more than once")]
    DuplicateName(String),

    /// Texture upload rejected a glyph bitmap
    #[error("uploading texture for glyph '{name}' failed: {source}")]
    Upload {
        /// Glyph name
        name: String,
        /// Upload failure
        source: TextureError,
    },
}

/// Half-open vertex range of one glyph in the shared vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshRange {
    /// First vertex
    pub begin: u32,
    /// One past the last vertex
    pub end: u32,
}

impl MeshRange {
    /// Number of vertices in the range
    pub fn count(&self) -> u32 {
        self.end - self.begin
    }
}

/// Uploaded texture of one glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphTexture {
    /// Handle returned by the uploader
    pub handle: TextureHandle,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
}

/// Resolve and validate the name an index entry points at
fn entry_name<'a, E: NamedEntry>(names: &'a [u8], entry: &E, index: usize) -> Result<&'a str, IndexError> {
    let range = entry.name_range();
    if range.start > range.end || range.end > names.len() {
        return Err(IndexError::NameOutOfRange {
            index,
            begin: range.start as u32,
            end: range.end as u32,
            len: names.len(),
        });
    }
    std::str::from_utf8(&names[range]).map_err(|_| IndexError::InvalidName { index })
}

fn check_range(name: &str, what: &'static str, begin: u32, end: u32, len: usize) -> Result<(), IndexError> {
    if begin <= end && end as usize <= len {
        Ok(())
    } else {
        Err(IndexError::RangeOutOfBounds { name: name.to_string(), what, begin, end, len })
    }
}

fn open_asset(path: &Path) -> Result<BufReader<File>, IndexError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IndexError::Open { path: path.display().to_string(), source })
}

/// Geometry asset: shared vertex buffer plus name → vertex range
#[derive(Debug, Clone, Default)]
pub struct MeshIndex {
    vertices: Vec<GlyphVertex>,
    ranges: HashMap<String, MeshRange>,
}

impl MeshIndex {
    /// Read `pnct`, `str0`, `idx0` in that order
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, IndexError> {
        let vertices: Vec<GlyphVertex> = read_chunk(reader, &PNCT)?;
        let names: Vec<u8> = read_chunk(reader, &STR0)?;
        let index: Vec<GeometryIndexEntry> = read_chunk(reader, &IDX0)?;

        let mut ranges = HashMap::with_capacity(index.len());
        for (i, entry) in index.iter().enumerate() {
            let name = entry_name(&names, entry, i)?;
            check_range(name, "vertices", entry.vertex_begin, entry.vertex_end, vertices.len())?;

            let range = MeshRange { begin: entry.vertex_begin, end: entry.vertex_end };
            if ranges.insert(name.to_string(), range).is_some() {
                return Err(IndexError::DuplicateName(name.to_string()));
            }
        }

        log::info!("Loaded {} glyph meshes ({} vertices)", ranges.len(), vertices.len());
        Ok(Self { vertices, ranges })
    }

    /// Load the geometry asset from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        Self::load(&mut open_asset(path.as_ref())?)
    }

    /// Vertex range of a glyph
    pub fn lookup(&self, name: &str) -> Option<MeshRange> {
        self.ranges.get(name).copied()
    }

    /// Shared vertex buffer for mesh upload
    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    /// Read-only name → range table
    pub fn ranges(&self) -> &HashMap<String, MeshRange> {
        &self.ranges
    }

    /// Number of glyph meshes
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when the asset has no glyphs
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Texture asset: name → uploaded texture
#[derive(Debug, Clone, Default)]
pub struct TextureIndex {
    textures: HashMap<String, GlyphTexture>,
}

impl TextureIndex {
    /// Read `txtr`, `str0`, `idx1` in that order and upload every glyph bitmap
    pub fn load<R: Read>(reader: &mut R, uploader: &mut dyn TextureUploader) -> Result<Self, IndexError> {
        let coverage: Vec<u8> = read_chunk(reader, &TXTR)?;
        let names: Vec<u8> = read_chunk(reader, &STR0)?;
        let index: Vec<TextureIndexEntry> = read_chunk(reader, &IDX1)?;

        // Validate everything before the first upload.
        let mut validated = Vec::with_capacity(index.len());
        let mut seen = HashSet::with_capacity(index.len());
        for (i, entry) in index.iter().enumerate() {
            let name = entry_name(&names, entry, i)?;
            if !seen.insert(name) {
                return Err(IndexError::DuplicateName(name.to_string()));
            }
            check_range(name, "texture bytes", entry.tex_begin, entry.tex_end, coverage.len())?;

            let len = entry.tex_range().len();
            if len as u64 != u64::from(entry.width) * u64::from(entry.height) {
                return Err(IndexError::DimensionMismatch {
                    name: name.to_string(),
                    len,
                    width: entry.width,
                    height: entry.height,
                });
            }
            validated.push((name, entry));
        }

        let mut textures = HashMap::with_capacity(validated.len());
        for (name, entry) in validated {
            let image = ImageData::from_alpha_coverage(entry.width, entry.height, &coverage[entry.tex_range()])
                .map_err(|e| IndexError::Upload {
                    name: name.to_string(),
                    source: TextureError::Backend(e.to_string()),
                })?;
            let handle = uploader
                .upload_rgba(image.width, image.height, &image.data, TextureParams::default())
                .map_err(|source| IndexError::Upload { name: name.to_string(), source })?;

            textures.insert(
                name.to_string(),
                GlyphTexture { handle, width: entry.width, height: entry.height },
            );
        }

        log::info!("Loaded {} glyph textures ({} coverage bytes)", textures.len(), coverage.len());
        Ok(Self { textures })
    }

    /// Load the texture asset from a file
    pub fn open<P: AsRef<Path>>(path: P, uploader: &mut dyn TextureUploader) -> Result<Self, IndexError> {
        Self::load(&mut open_asset(path.as_ref())?, uploader)
    }

    /// Texture of a glyph
    pub fn lookup(&self, name: &str) -> Option<GlyphTexture> {
        self.textures.get(name).copied()
    }

    /// Read-only name → texture table
    pub fn textures(&self) -> &HashMap<String, GlyphTexture> {
        &self.textures
    }

    /// Number of glyph textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True when the asset has no glyphs
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Everything needed to draw one glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAsset {
    /// Glyph name (join key between the two assets)
    pub name: String,
    /// Vertex range in the shared buffer
    pub mesh: MeshRange,
    /// Uploaded bitmap
    pub texture: GlyphTexture,
}

/// Joined, read-only view of both glyph assets
#[derive(Debug, Clone, Default)]
pub struct GlyphAssets {
    glyphs: HashMap<String, GlyphAsset>,
    meshes: MeshIndex,
}

impl GlyphAssets {
    /// Join the geometry and texture tables on glyph name
    ///
    /// Names present in only one asset cannot be drawn and are left out.
    pub fn new(meshes: MeshIndex, textures: &TextureIndex) -> Self {
        let mut glyphs = HashMap::with_capacity(meshes.len());
        for (name, &mesh) in meshes.ranges() {
            match textures.lookup(name) {
                Some(texture) => {
                    glyphs.insert(name.clone(), GlyphAsset { name: name.clone(), mesh, texture });
                }
                None => log::warn!("Glyph '{}' has geometry but no texture; not drawable", name),
            }
        }
        for name in textures.textures().keys().filter(|n| meshes.lookup(n).is_none()) {
            log::warn!("Glyph '{}' has a texture but no geometry; not drawable", name);
        }

        log::info!("Glyph assets ready: {} drawable glyphs", glyphs.len());
        Self { glyphs, meshes }
    }

    /// Asset for a glyph name; unknown names are a caller/data mismatch
    pub fn get(&self, name: &str) -> Result<&GlyphAsset, TextError> {
        self.glyphs
            .get(name)
            .ok_or_else(|| TextError::MissingGlyph(name.to_string()))
    }

    /// True if the glyph can be drawn
    pub fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    /// Name → mesh range for direct drawable creation
    pub fn mesh_range(&self, name: &str) -> Result<MeshRange, TextError> {
        self.get(name).map(|asset| asset.mesh)
    }

    /// Name → texture handle for direct drawable creation
    pub fn texture(&self, name: &str) -> Result<TextureHandle, TextError> {
        self.get(name).map(|asset| asset.texture.handle)
    }

    /// Shared vertex buffer for the mesh-upload subsystem
    pub fn vertices(&self) -> &[GlyphVertex] {
        self.meshes.vertices()
    }

    /// Iterate all drawable glyphs
    pub fn iter(&self) -> impl Iterator<Item = &GlyphAsset> {
        self.glyphs.values()
    }

    /// Number of drawable glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// True when no glyph is drawable
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
