//! Glyph asset formats and loading
//!
//! - [`chunk`]: the tagged, length-prefixed container both assets are written in
//! - [`glyph_records`]: packed vertex and index records
//! - [`glyph_index`]: validated name-keyed tables built from the baked files
//! - [`image_loader`]: RGBA image data handed to texture upload

pub mod chunk;
pub mod glyph_records;
pub mod glyph_index;
pub mod image_loader;

pub use chunk::{read_chunk, write_chunk, ChunkError, ChunkTag};
pub use glyph_records::{GlyphVertex, GeometryIndexEntry, TextureIndexEntry};
pub use glyph_index::{
    GlyphAsset, GlyphAssets, GlyphTexture, IndexError, MeshIndex, MeshRange, TextureIndex,
};
pub use image_loader::ImageData;

use thiserror::Error;

/// Asset processing errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Failed to load or write an asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
