// SPDX-License-Identifier: MIT
//! GLB (binary glTF) container format
//!
//! Defines the header and chunk layout plus the length bookkeeping used when
//! assembling a container.

use std::io::Write;

use crate::error::GlbError;

/// GLB magic bytes: "glTF"
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// GLB container version
pub const GLB_VERSION: u32 = 2;

/// File header size in bytes (magic + version + length)
pub const GLB_HEADER_SIZE: usize = 12;

/// Chunk header size in bytes (length + type)
pub const GLB_CHUNK_HEADER_SIZE: usize = 8;

/// Every chunk must end on this boundary
pub const GLB_CHUNK_ALIGNMENT: usize = 4;

/// Padding byte for the JSON chunk
pub const JSON_PADDING_BYTE: u8 = b' ';

/// Padding byte for the BIN chunk
pub const BIN_PADDING_BYTE: u8 = 0x00;

/// Number of bytes needed to bring `len` up to the chunk alignment.
///
/// Always in `0..GLB_CHUNK_ALIGNMENT`.
#[inline]
pub fn padding(len: usize) -> usize {
    (GLB_CHUNK_ALIGNMENT - len % GLB_CHUNK_ALIGNMENT) % GLB_CHUNK_ALIGNMENT
}

/// Chunk types in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// Structured JSON manifest
    Json,

    /// Binary buffer payload
    Bin,
}

impl ChunkType {
    /// Four-byte tag written after the chunk length
    pub fn tag(&self) -> &'static [u8; 4] {
        match self {
            ChunkType::Json => b"JSON",
            ChunkType::Bin => b"BIN\0",
        }
    }

    /// Tag as the little-endian `u32` the format documents
    pub fn tag_u32(&self) -> u32 {
        u32::from_le_bytes(*self.tag())
    }

    /// Byte used to pad this chunk to alignment
    pub fn padding_byte(&self) -> u8 {
        match self {
            ChunkType::Json => JSON_PADDING_BYTE,
            ChunkType::Bin => BIN_PADDING_BYTE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChunkType::Json => "json",
            ChunkType::Bin => "bin",
        }
    }
}

/// GLB file header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    /// Magic bytes: "glTF"
    pub magic: [u8; 4],

    /// Container version (always 2)
    pub version: u32,

    /// Total container length in bytes, header included
    pub length: u32,
}

impl GlbHeader {
    pub fn new(length: u32) -> Self {
        Self {
            magic: *GLB_MAGIC,
            version: GLB_VERSION,
            length,
        }
    }

    /// Write header to a writer
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), std::io::Error> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.length.to_le_bytes())?;

        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; GLB_HEADER_SIZE] {
        let mut bytes = [0u8; GLB_HEADER_SIZE];

        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.length.to_le_bytes());

        bytes
    }
}

/// Chunk header (8 bytes) preceding each chunk payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Payload length including padding
    pub length: u32,

    pub chunk_type: ChunkType,
}

impl ChunkHeader {
    pub fn new(chunk_type: ChunkType, length: u32) -> Self {
        Self { length, chunk_type }
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), std::io::Error> {
        writer.write_all(&self.length.to_le_bytes())?;
        writer.write_all(self.chunk_type.tag())?;

        Ok(())
    }
}

/// Computed sizes of a container before anything is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLayout {
    /// Manifest length without padding
    pub json_len: u32,
    pub json_padding: u32,

    /// Staged binary length without padding
    pub bin_len: u32,
    pub bin_padding: u32,

    /// Value written into the file header
    pub total_len: u32,
}

impl ContainerLayout {
    /// Compute the layout for a manifest of `json_len` bytes and `bin_len`
    /// staged bytes. Fails if any length exceeds what a `u32` field can hold.
    pub fn compute(json_len: usize, bin_len: u64) -> Result<Self, GlbError> {
        let bin_len = usize::try_from(bin_len).map_err(|_| GlbError::LengthOverflow {
            chunk: ChunkType::Bin.name(),
            len: bin_len,
        })?;

        let json_padding = padding(json_len);
        let bin_padding = padding(bin_len);

        let json_chunk = checked_chunk_len(ChunkType::Json, json_len, json_padding)?;
        let bin_chunk = checked_chunk_len(ChunkType::Bin, bin_len, bin_padding)?;

        let total = (GLB_HEADER_SIZE as u64)
            + (GLB_CHUNK_HEADER_SIZE as u64 + json_chunk as u64)
            + (GLB_CHUNK_HEADER_SIZE as u64 + bin_chunk as u64);
        let total_len = u32::try_from(total).map_err(|_| GlbError::LengthOverflow {
            chunk: "container",
            len: total,
        })?;

        Ok(Self {
            json_len: json_len as u32,
            json_padding: json_padding as u32,
            bin_len: bin_len as u32,
            bin_padding: bin_padding as u32,
            total_len,
        })
    }

    /// JSON chunk length as declared in its chunk header
    pub fn json_chunk_len(&self) -> u32 {
        self.json_len + self.json_padding
    }

    /// BIN chunk length as declared in its chunk header
    pub fn bin_chunk_len(&self) -> u32 {
        self.bin_len + self.bin_padding
    }

    /// Offset of the BIN chunk header from the start of the file
    pub fn bin_chunk_offset(&self) -> u64 {
        (GLB_HEADER_SIZE + GLB_CHUNK_HEADER_SIZE) as u64 + self.json_chunk_len() as u64
    }

    pub fn header(&self) -> GlbHeader {
        GlbHeader::new(self.total_len)
    }

    pub fn json_chunk_header(&self) -> ChunkHeader {
        ChunkHeader::new(ChunkType::Json, self.json_chunk_len())
    }

    pub fn bin_chunk_header(&self) -> ChunkHeader {
        ChunkHeader::new(ChunkType::Bin, self.bin_chunk_len())
    }
}

fn checked_chunk_len(chunk_type: ChunkType, len: usize, pad: usize) -> Result<u32, GlbError> {
    len.checked_add(pad)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(GlbError::LengthOverflow {
            chunk: chunk_type.name(),
            len: len as u64,
        })
}
