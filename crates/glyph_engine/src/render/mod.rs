//! Rendering-side services consumed by the glyph pipeline
//!
//! Only texture upload lives here; mesh upload and shader binding belong to
//! the host renderer and are referenced through scene drawables.

pub mod texture_manager;

pub use texture_manager::{
    TextureHandle, TextureUploader, TextureManager, TextureInfo, TextureParams, TextureError,
    FilterMode, WrapMode,
};
