//! Packed records stored in glyph asset chunks
//!
//! Every record is `#[repr(C)]` and derives [`bytemuck::Pod`], which refuses to
//! compile if the layout contains padding. The size assertions below pin the
//! on-disk record widths.

use bytemuck::{Pod, Zeroable};
use std::ops::Range;

/// Vertex of a glyph quad (`pnct` chunk)
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct GlyphVertex {
    /// Position in glyph-local world units
    pub position: [f32; 3],
    /// Surface normal, always +Z for glyph quads
    pub normal: [f32; 3],
    /// RGBA color
    pub color: [u8; 4],
    /// Texture coordinate, (0,0) at the bitmap's top-left
    pub tex_coord: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<GlyphVertex>() == 3 * 4 + 3 * 4 + 4 + 2 * 4);

impl GlyphVertex {
    /// Normal shared by every glyph vertex
    pub const NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
    /// Opaque black; the texture supplies coverage
    pub const COLOR: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

    /// Glyph vertex at `position` sampling the bitmap at `tex_coord`
    pub fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal: Self::NORMAL,
            color: Self::COLOR,
            tex_coord,
        }
    }
}

/// Name and vertex range of one glyph (`idx0` chunk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct GeometryIndexEntry {
    /// Start of the name in the `str0` table
    pub name_begin: u32,
    /// End (exclusive) of the name in the `str0` table
    pub name_end: u32,
    /// First vertex in the `pnct` chunk
    pub vertex_begin: u32,
    /// One past the last vertex
    pub vertex_end: u32,
}

const _: () = assert!(std::mem::size_of::<GeometryIndexEntry>() == 16);

/// Name, coverage range and bitmap size of one glyph (`idx1` chunk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct TextureIndexEntry {
    /// Start of the name in the `str0` table
    pub name_begin: u32,
    /// End (exclusive) of the name in the `str0` table
    pub name_end: u32,
    /// First coverage byte in the `txtr` chunk
    pub tex_begin: u32,
    /// One past the last coverage byte
    pub tex_end: u32,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels (rows)
    pub height: u32,
}

const _: () = assert!(std::mem::size_of::<TextureIndexEntry>() == 24);

/// Shared accessors for the name slice of an index entry
pub trait NamedEntry {
    /// Byte range of the name inside the name table
    fn name_range(&self) -> Range<usize>;
}

impl NamedEntry for GeometryIndexEntry {
    fn name_range(&self) -> Range<usize> {
        self.name_begin as usize..self.name_end as usize
    }
}

impl NamedEntry for TextureIndexEntry {
    fn name_range(&self) -> Range<usize> {
        self.name_begin as usize..self.name_end as usize
    }
}

impl GeometryIndexEntry {
    /// Vertex range as indices
    pub fn vertex_range(&self) -> Range<usize> {
        self.vertex_begin as usize..self.vertex_end as usize
    }
}

impl TextureIndexEntry {
    /// Coverage byte range as indices
    pub fn tex_range(&self) -> Range<usize> {
        self.tex_begin as usize..self.tex_end as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_defaults() {
        let v = GlyphVertex::new([1.0, 2.0, 0.0], [0.0, 1.0]);
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        assert_eq!(v.color, [0, 0, 0, 255]);
        assert_eq!(bytemuck::bytes_of(&v).len(), 36);
    }

    #[test]
    fn test_field_order_on_disk() {
        let entry = TextureIndexEntry {
            name_begin: 1,
            name_end: 2,
            tex_begin: 3,
            tex_end: 4,
            width: 5,
            height: 6,
        };
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&entry));
        assert_eq!(words, &[1, 2, 3, 4, 5, 6]);
    }
}
