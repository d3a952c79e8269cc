//! Chunked binary container
//!
//! An asset file is a flat sequence of chunks, each laid out as
//!
//! ```text
//! [tag: 4 ASCII bytes][length: u32 little-endian][payload: length bytes]
//! ```
//!
//! The payload of a chunk is the raw bytes of a packed record slice. There is
//! no index or directory; readers know the chunk order of each asset kind and
//! must consume chunks in exactly that order.

use bytemuck::Pod;
use std::io::{self, Read, Write};
use thiserror::Error;

#[cfg(target_endian = "big")]
compile_error!("glyph asset records are stored little-endian and read by casting");

/// Four-byte chunk identifier
pub type ChunkTag = [u8; 4];

/// Vertex records of the geometry asset
pub const PNCT: ChunkTag = *b"pnct";
/// Concatenated glyph names (both assets)
pub const STR0: ChunkTag = *b"str0";
/// Geometry index records
pub const IDX0: ChunkTag = *b"idx0";
/// Single-channel coverage bytes of the texture asset
pub const TXTR: ChunkTag = *b"txtr";
/// Texture index records
pub const IDX1: ChunkTag = *b"idx1";

/// Errors raised while reading or writing chunks
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The next chunk on disk carries a different tag
    #[error("expected chunk '{}', found '{}'", tag_display(.expected), tag_display(.found))]
    TagMismatch {
        /// Tag the caller asked for
        expected: ChunkTag,
        /// Tag present in the stream
        found: ChunkTag,
    },

    /// The stream ended inside a chunk header or payload
    #[error("chunk '{}' truncated: {context}", tag_display(.tag))]
    Truncated {
        /// Chunk being read
        tag: ChunkTag,
        /// Which part was cut short
        context: &'static str,
    },

    /// Payload length is not a whole number of records
    #[error("chunk '{}' holds {length} bytes, not a multiple of the {record_size}-byte record", tag_display(.tag))]
    RecordSize {
        /// Chunk being read
        tag: ChunkTag,
        /// Declared payload length
        length: usize,
        /// Size of one record
        record_size: usize,
    },

    /// Payload does not fit the 32-bit length field
    #[error("chunk '{}' payload of {length} bytes exceeds u32::MAX", tag_display(.tag))]
    TooLarge {
        /// Chunk being written
        tag: ChunkTag,
        /// Payload size in bytes
        length: usize,
    },

    /// Underlying stream failure
    #[error("chunk I/O error: {0}")]
    Io(#[from] io::Error),
}

fn tag_display(tag: &ChunkTag) -> String {
    tag.escape_ascii().to_string()
}

/// Append one chunk holding `records` to `writer`
pub fn write_chunk<T: Pod, W: Write>(
    writer: &mut W,
    tag: &ChunkTag,
    records: &[T],
) -> Result<(), ChunkError> {
    let bytes: &[u8] = bytemuck::cast_slice(records);
    let length = u32::try_from(bytes.len())
        .map_err(|_| ChunkError::TooLarge { tag: *tag, length: bytes.len() })?;

    writer.write_all(tag)?;
    writer.write_all(&length.to_le_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Read the next chunk from `reader`, which must be tagged `expected`
pub fn read_chunk<T: Pod, R: Read>(
    reader: &mut R,
    expected: &ChunkTag,
) -> Result<Vec<T>, ChunkError> {
    let mut tag = [0u8; 4];
    read_exact_or(reader, &mut tag, *expected, "missing chunk header")?;
    if &tag != expected {
        return Err(ChunkError::TagMismatch { expected: *expected, found: tag });
    }

    let mut length = [0u8; 4];
    read_exact_or(reader, &mut length, tag, "missing length")?;
    let length = u32::from_le_bytes(length) as usize;

    let record_size = std::mem::size_of::<T>();
    if record_size == 0 || length % record_size != 0 {
        return Err(ChunkError::RecordSize { tag, length, record_size });
    }

    // The declared length is untrusted; never preallocate it.
    let mut payload = Vec::new();
    reader.take(length as u64).read_to_end(&mut payload)?;
    if payload.len() != length {
        return Err(ChunkError::Truncated { tag, context: "payload shorter than declared length" });
    }

    Ok(bytemuck::pod_collect_to_vec(&payload))
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    tag: ChunkTag,
    context: &'static str,
) -> Result<(), ChunkError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ChunkError::Truncated { tag, context },
        _ => ChunkError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::glyph_records::GeometryIndexEntry;
    use std::io::Cursor;

    #[test]
    fn test_round_trip_bytes() {
        let mut out = Vec::new();
        write_chunk(&mut out, &STR0, b"Aa.notdef").unwrap();
        assert_eq!(&out[..4], b"str0");
        assert_eq!(&out[4..8], &9u32.to_le_bytes());

        let back: Vec<u8> = read_chunk(&mut Cursor::new(out), &STR0).unwrap();
        assert_eq!(back, b"Aa.notdef");
    }

    #[test]
    fn test_round_trip_empty_payload() {
        let mut out = Vec::new();
        write_chunk::<u8, _>(&mut out, &TXTR, &[]).unwrap();
        assert_eq!(out.len(), 8);

        let back: Vec<u8> = read_chunk(&mut Cursor::new(out), &TXTR).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_records_are_packed() {
        let entries = [
            GeometryIndexEntry { name_begin: 0, name_end: 1, vertex_begin: 0, vertex_end: 6 },
            GeometryIndexEntry { name_begin: 1, name_end: 2, vertex_begin: 6, vertex_end: 12 },
        ];
        let mut out = Vec::new();
        write_chunk(&mut out, &IDX0, &entries).unwrap();
        assert_eq!(out.len(), 8 + 2 * 16);

        let back: Vec<GeometryIndexEntry> = read_chunk(&mut Cursor::new(out), &IDX0).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_chunks_read_in_written_order() {
        let mut out = Vec::new();
        write_chunk(&mut out, &TXTR, &[1u8, 2, 3]).unwrap();
        write_chunk(&mut out, &STR0, b"A").unwrap();

        let mut cursor = Cursor::new(out);
        let colors: Vec<u8> = read_chunk(&mut cursor, &TXTR).unwrap();
        let names: Vec<u8> = read_chunk(&mut cursor, &STR0).unwrap();
        assert_eq!(colors, [1, 2, 3]);
        assert_eq!(names, b"A");
    }

    #[test]
    fn test_tag_mismatch() {
        let mut out = Vec::new();
        write_chunk(&mut out, &STR0, b"A").unwrap();

        let err = read_chunk::<u8, _>(&mut Cursor::new(out), &TXTR).unwrap_err();
        assert!(matches!(err, ChunkError::TagMismatch { expected, found } if expected == TXTR && found == STR0));
    }

    #[test]
    fn test_truncated_payload() {
        let mut out = Vec::new();
        write_chunk(&mut out, &STR0, b"glyphs").unwrap();
        out.truncate(out.len() - 2);

        let err = read_chunk::<u8, _>(&mut Cursor::new(out), &STR0).unwrap_err();
        assert!(matches!(err, ChunkError::Truncated { .. }));
    }

    #[test]
    fn test_truncated_header() {
        let err = read_chunk::<u8, _>(&mut Cursor::new(b"st".to_vec()), &STR0).unwrap_err();
        assert!(matches!(err, ChunkError::Truncated { .. }));

        let err = read_chunk::<u8, _>(&mut Cursor::new(b"str0\x01".to_vec()), &STR0).unwrap_err();
        assert!(matches!(err, ChunkError::Truncated { .. }));
    }

    #[test]
    fn test_partial_record_rejected() {
        let mut out = Vec::new();
        write_chunk(&mut out, &IDX0, &[0u8; 20]).unwrap();

        let err = read_chunk::<GeometryIndexEntry, _>(&mut Cursor::new(out), &IDX0).unwrap_err();
        assert!(matches!(err, ChunkError::RecordSize { length: 20, record_size: 16, .. }));
    }
}
