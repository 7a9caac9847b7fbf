//! GLB container demuxing.
//!
//! A container is a 12-byte header (`glTF` magic, version 2, total length)
//! followed by length-prefixed, type-tagged chunks. Exactly one `JSON` chunk
//! is required and at most one `BIN\0` chunk may follow; any other chunk tag
//! is rejected.

use serde_json::Value;
use vrm_core::decoder_buffer::DecoderBuffer;
use vrm_core::status::CoreError;

use crate::error::{Result, VrmError};

pub const GLB_MAGIC: &[u8; 4] = b"glTF";
pub const GLB_VERSION: u32 = 2;
pub const GLB_HEADER_SIZE: usize = 12;
pub const GLB_CHUNK_HEADER_SIZE: usize = 8;
pub const GLB_CHUNK_JSON: &[u8; 4] = b"JSON";
pub const GLB_CHUNK_BIN: &[u8; 4] = b"BIN\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub version: u32,
    /// Declared byte length of the whole container, header included.
    pub length: u32,
}

/// The two payloads of a container.
#[derive(Debug)]
pub struct GlbContainer<'a> {
    pub header: GlbHeader,
    /// Parsed JSON chunk. Object key order is preserved.
    pub json: Value,
    /// Binary chunk, or an empty slice for JSON-only containers.
    pub binary: &'a [u8],
}

/// Returns true if `data` starts with the container magic.
pub fn is_glb(data: &[u8]) -> bool {
    data.starts_with(GLB_MAGIC)
}

fn read_header(reader: &mut DecoderBuffer<'_>) -> Result<GlbHeader> {
    if reader.len() < GLB_HEADER_SIZE {
        return Err(VrmError::InvalidGlb("File too small for GLB header".into()));
    }
    let magic = reader.read_bytes(4)?;
    if magic != GLB_MAGIC {
        return Err(VrmError::InvalidGlb(format!(
            "glTF header signature not found: {:?}",
            String::from_utf8_lossy(magic)
        )));
    }

    let version = reader.read_u32()?;
    if version != GLB_VERSION {
        return Err(VrmError::InvalidGlb(format!(
            "Unsupported GLB version: {} (only version {} is supported)",
            version, GLB_VERSION
        )));
    }

    let length = reader.read_u32()?;
    if (length as usize) < GLB_HEADER_SIZE {
        return Err(VrmError::InvalidGlb(format!(
            "Declared length {} is smaller than the header",
            length
        )));
    }
    if length as usize > reader.len() {
        return Err(VrmError::InvalidGlb(format!(
            "File truncated: declared length {} but only {} bytes present",
            length,
            reader.len()
        )));
    }
    if (length as usize) < reader.len() {
        tracing::warn!(
            declared = length,
            actual = reader.len(),
            "ignoring trailing bytes after GLB container"
        );
    }

    Ok(GlbHeader { version, length })
}

/// Splits a container into its parsed JSON document and binary payload.
pub fn parse_glb(data: &[u8]) -> Result<GlbContainer<'_>> {
    let mut reader = DecoderBuffer::new(data);
    let header = read_header(&mut reader)?;

    let mut remaining = header.length as usize - GLB_HEADER_SIZE;
    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;

    while remaining > 0 {
        if remaining < GLB_CHUNK_HEADER_SIZE {
            return Err(VrmError::InvalidGlb(format!(
                "{} stray bytes where a chunk header was expected",
                remaining
            )));
        }
        let chunk_length = reader.read_u32()? as usize;
        let chunk_type = reader.read_bytes(4)?;
        let consumed = GLB_CHUNK_HEADER_SIZE + chunk_length;
        if consumed > remaining {
            return Err(VrmError::InvalidGlb(format!(
                "Chunk of {} bytes exceeds the {} bytes left of the declared length",
                chunk_length,
                remaining - GLB_CHUNK_HEADER_SIZE
            )));
        }
        let chunk_data = reader.read_bytes(chunk_length)?;
        remaining -= consumed;

        tracing::debug!(
            chunk_type = %String::from_utf8_lossy(chunk_type),
            chunk_length,
            remaining,
            "read GLB chunk"
        );

        if chunk_type == GLB_CHUNK_JSON {
            if json_chunk.replace(chunk_data).is_some() {
                return Err(VrmError::InvalidGlb("Multiple JSON chunks".into()));
            }
        } else if chunk_type == GLB_CHUNK_BIN {
            if bin_chunk.replace(chunk_data).is_some() {
                return Err(VrmError::InvalidGlb("Multiple BIN chunks".into()));
            }
        } else {
            return Err(VrmError::InvalidGlb(format!(
                "Unknown chunk type: {:?}",
                String::from_utf8_lossy(chunk_type)
            )));
        }
    }

    let json_data = json_chunk.ok_or_else(|| VrmError::InvalidGlb("No JSON chunk".into()))?;
    let json_text = std::str::from_utf8(json_data)
        .map_err(|e| VrmError::Decode(CoreError::InvalidText(format!("JSON chunk: {}", e))))?;
    let json: Value = serde_json::from_str(json_text)?;

    Ok(GlbContainer {
        header,
        json,
        binary: bin_chunk.unwrap_or(&[]),
    })
}
