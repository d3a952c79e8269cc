//! Image data for glyph texture upload
//!
//! Glyph bitmaps are baked as single-channel coverage; texture consumers want
//! four channels, so coverage is expanded here before upload.

use std::path::Path;
use crate::assets::AssetError;

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Expand row-major coverage bytes into opaque-black RGBA `(0, 0, 0, alpha)`
    pub fn from_alpha_coverage(width: u32, height: u32, coverage: &[u8]) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize;
        if coverage.len() != expected {
            return Err(AssetError::InvalidData(format!(
                "coverage of {} bytes does not fill a {}x{} bitmap",
                coverage.len(),
                width,
                height
            )));
        }

        let mut data = Vec::with_capacity(expected * 4);
        for &alpha in coverage {
            data.extend_from_slice(&[0, 0, 0, alpha]);
        }

        Ok(Self {
            data,
            width,
            height,
            channels: 4,
        })
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Write the image as PNG (debug export of baked glyphs)
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), AssetError> {
        let path_ref = path.as_ref();
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| AssetError::InvalidData(format!(
                "{}x{} RGBA image needs {} bytes, have {}",
                self.width,
                self.height,
                self.width as usize * self.height as usize * 4,
                self.data.len()
            )))?;

        buffer
            .save_with_format(path_ref, image::ImageFormat::Png)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to write {}: {}", path_ref.display(), e)))?;

        log::debug!("Saved {}x{} image to {:?}", self.width, self.height, path_ref);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_expands_to_black_rgba() {
        let img = ImageData::from_alpha_coverage(2, 1, &[0x10, 0xff]).unwrap();
        assert_eq!(img.channels, 4);
        assert_eq!(img.size_bytes(), 2 * 4);
        assert_eq!(img.data, [0, 0, 0, 0x10, 0, 0, 0, 0xff]);
    }

    #[test]
    fn test_empty_bitmap() {
        let img = ImageData::from_alpha_coverage(0, 0, &[]).unwrap();
        assert!(img.data.is_empty());
    }

    #[test]
    fn test_coverage_size_mismatch() {
        assert!(ImageData::from_alpha_coverage(2, 2, &[0; 3]).is_err());
    }
}
