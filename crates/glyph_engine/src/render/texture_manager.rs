//! Texture upload service
//!
//! The glyph index loader hands decoded RGBA glyph bitmaps to a
//! [`TextureUploader`] and keeps only the returned handle. [`TextureManager`]
//! is the CPU-side implementation used by the tools and tests; a GPU backend
//! implements the same trait.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::assets::ImageData;

/// Handle for an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Texture filtering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest neighbor filtering
    Nearest,
    /// Linear filtering
    Linear,
}

/// Texture wrapping modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Repeat the texture
    Repeat,
    /// Clamp to edge
    ClampToEdge,
}

/// Texture creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    /// Texture filtering mode
    pub filter_mode: FilterMode,
    /// Texture wrapping mode
    pub wrap_mode: WrapMode,
}

impl Default for TextureParams {
    /// Glyph textures: clamped so quad edges do not bleed, linearly filtered
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::Linear,
            wrap_mode: WrapMode::ClampToEdge,
        }
    }
}

/// Errors from texture upload
#[derive(Debug, Error)]
pub enum TextureError {
    /// Pixel buffer does not match the stated dimensions
    #[error("RGBA buffer of {actual} bytes does not match {width}x{height} (expected {expected})")]
    SizeMismatch {
        /// Texture width
        width: u32,
        /// Texture height
        height: u32,
        /// `width * height * 4`
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Handle was never issued by this manager
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureHandle),

    /// Backend-specific failure
    #[error("Texture upload failed: {0}")]
    Backend(String),
}

/// Accepts raw RGBA bytes and returns an opaque handle
pub trait TextureUploader {
    /// Upload a `width x height` RGBA8 image
    fn upload_rgba(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
        params: TextureParams,
    ) -> Result<TextureHandle, TextureError>;
}

/// Information about a stored texture
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Texture handle
    pub handle: TextureHandle,
    /// Creation parameters
    pub params: TextureParams,
    /// Pixel data as uploaded
    pub image: ImageData,
}

/// CPU-side texture store
pub struct TextureManager {
    /// Registered textures
    textures: HashMap<TextureHandle, TextureInfo>,
    /// Next available texture handle
    next_handle: u32,
}

impl TextureManager {
    /// Create a new texture manager
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            next_handle: 1, // Start from 1, reserve 0 for "no texture"
        }
    }

    /// Get texture information
    pub fn get_texture_info(&self, handle: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(&handle)
    }

    /// Get number of loaded textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Write one texture to disk as PNG
    pub fn save_png<P: AsRef<Path>>(&self, handle: TextureHandle, path: P) -> Result<(), TextureError> {
        let info = self
            .textures
            .get(&handle)
            .ok_or(TextureError::UnknownTexture(handle))?;
        info.image
            .save_png(path)
            .map_err(|e| TextureError::Backend(e.to_string()))
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureUploader for TextureManager {
    fn upload_rgba(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
        params: TextureParams,
    ) -> Result<TextureHandle, TextureError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;

        let image = ImageData {
            data: rgba.to_vec(),
            width,
            height,
            channels: 4,
        };
        self.textures.insert(handle, TextureInfo { handle, params, image });

        log::trace!("Uploaded {}x{} texture {:?}", width, height, handle);
        Ok(handle)
    }
}
