// SPDX-License-Identifier: MIT
//! # GLB Writer
//!
//! Packs a glTF JSON manifest and one embedded binary buffer into a single
//! binary glTF (GLB) container.
//!
//! ## Format Overview
//!
//! ```text
//! GLB container v2 (all integers little-endian u32)
//! =================================================
//!
//! Header (12 bytes):
//! - Magic: "glTF"
//! - Version: 2
//! - Length: total container length in bytes
//!
//! JSON chunk:
//! - Chunk length: manifest length + padding
//! - Chunk type: "JSON"
//! - Manifest, padded with spaces to a 4-byte boundary
//!
//! BIN chunk:
//! - Chunk length: staged length + padding
//! - Chunk type: "BIN\0"
//! - Embedded buffer, padded with zeros to a 4-byte boundary
//! ```
//!
//! Buffer views written to [`GLB_BUFFER_ID`] are staged until
//! [`GlbResourceWriter::finalize`]. Any other buffer id is written to its own
//! external stream (`{prefix}{id}.bin`) through the [`StreamWriter`] port.
//!
//! ## Usage
//!
//! ```rust
//! use glb_writer::{BufferWriter, GlbResourceWriter, MemoryStreamWriter, GLB_BUFFER_ID};
//!
//! let streams = MemoryStreamWriter::new();
//! let mut writer = GlbResourceWriter::new(streams.clone());
//!
//! let view = writer.write_buffer_view(GLB_BUFFER_ID, &[0u8; 12]).unwrap();
//! assert_eq!(view.byte_offset, 0);
//! assert_eq!(writer.buffer_uri(GLB_BUFFER_ID).unwrap(), None);
//!
//! let layout = writer
//!     .finalize(r#"{"asset":{"version":"2.0"}}"#, "scene.glb")
//!     .unwrap();
//! assert_eq!(streams.contents("scene.glb").unwrap().len(), layout.total_len as usize);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod glb_writer;
pub mod ports;
pub mod resource_writer;
pub mod staging;
pub mod streams;

pub use config::{ConfigError, StagingKind, WriterConfig};
pub use error::GlbError;
pub use format::{padding, ChunkType, ContainerLayout, GLB_HEADER_SIZE, GLB_MAGIC, GLB_VERSION};
pub use glb_writer::{BufferTarget, GlbResourceWriter, GlbResourceWriterBuilder, GLB_BUFFER_ID};
pub use ports::{shared_stream, SharedStream, StreamError, StreamWriter};
pub use resource_writer::{BufferView, BufferWriter, ResourceWriter};
pub use staging::{temp_file_store, StagingStore};
pub use streams::{FileStreamWriter, MemoryStreamWriter, StreamCache};
