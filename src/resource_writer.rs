// SPDX-License-Identifier: MIT
//! Base resource writer for external buffers
//!
//! Tracks how many bytes have been written to each buffer and where each
//! buffer's stream lives. The GLB writer reuses this for everything except
//! its embedded buffer.

use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, instrument};

use crate::error::GlbError;
use crate::ports::{SharedStream, StreamWriter};
use crate::streams::StreamCache;

/// File extension for external buffer URIs
pub const BUFFER_EXTENSION: &str = "bin";

/// Location of a block of bytes written into a buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer_id: String,
    pub byte_offset: u64,
    pub byte_length: u64,
}

/// Buffer writing operations shared by plain and GLB resource writers
pub trait BufferWriter {
    /// URI a manifest should record for the buffer, `None` when the buffer
    /// has no external location
    fn buffer_uri(&self, buffer_id: &str) -> Result<Option<String>, GlbError>;

    /// Bytes written to the buffer so far
    fn buffer_offset(&self, buffer_id: &str) -> u64;

    /// Append `data` to the buffer, zero-padding first so the view starts at
    /// a multiple of `alignment`
    fn write_buffer_view_aligned(
        &mut self,
        buffer_id: &str,
        data: &[u8],
        alignment: u64,
    ) -> Result<BufferView, GlbError>;

    fn write_buffer_view(&mut self, buffer_id: &str, data: &[u8]) -> Result<BufferView, GlbError> {
        self.write_buffer_view_aligned(buffer_id, data, 1)
    }
}

/// Writes named buffers to streams resolved by URI
pub struct ResourceWriter {
    streams: StreamCache,
    offsets: HashMap<String, u64>,
    uri_prefix: String,
}

impl ResourceWriter {
    pub fn new<W: StreamWriter + 'static>(writer: W) -> Self {
        Self::from_cache(StreamCache::new(writer))
    }

    pub fn from_cache(streams: StreamCache) -> Self {
        Self {
            streams,
            offsets: HashMap::new(),
            uri_prefix: String::new(),
        }
    }

    /// Prefix prepended to every generated buffer URI
    pub fn with_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.uri_prefix = prefix.into();
        self
    }

    pub fn uri_prefix(&self) -> &str {
        &self.uri_prefix
    }

    /// Default URI for a buffer: {prefix}{buffer_id}.bin
    pub fn generate_buffer_uri(&self, buffer_id: &str) -> Result<String, GlbError> {
        if buffer_id.is_empty() {
            return Err(GlbError::InvalidBufferId(buffer_id.to_string()));
        }
        Ok(format!("{}{}.{}", self.uri_prefix, buffer_id, BUFFER_EXTENSION))
    }

    pub fn buffer_offset(&self, buffer_id: &str) -> u64 {
        self.offsets.get(buffer_id).copied().unwrap_or(0)
    }

    /// Stream backing a named buffer, opened through the cache
    pub fn buffer_stream(&mut self, buffer_id: &str) -> Result<SharedStream, GlbError> {
        let uri = self.generate_buffer_uri(buffer_id)?;
        self.resolve(&uri)
    }

    /// Whether a stream for `uri` has already been opened
    pub fn is_open(&self, uri: &str) -> bool {
        self.streams.contains(uri)
    }

    /// Resolve any URI through the stream cache
    pub fn resolve(&mut self, uri: &str) -> Result<SharedStream, GlbError> {
        self.streams
            .get(uri)
            .map_err(|source| GlbError::StreamUnavailable {
                uri: uri.to_string(),
                source,
            })
    }

    /// Append `data` to `stream` and account for it under `buffer_id`
    #[instrument(level = "debug", skip(self, stream, data), fields(len = data.len()))]
    pub fn append(
        &mut self,
        buffer_id: &str,
        stream: &SharedStream,
        data: &[u8],
        alignment: u64,
    ) -> Result<BufferView, GlbError> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(GlbError::InvalidAlignment(alignment));
        }

        let offset = self.buffer_offset(buffer_id);
        let pad = (alignment - offset % alignment) % alignment;

        {
            let mut guard = stream.lock();
            if pad > 0 {
                guard.write_all(&vec![0u8; pad as usize])?;
            }
            guard.write_all(data)?;
        }

        let byte_offset = offset + pad;
        let byte_length = data.len() as u64;
        self.offsets
            .insert(buffer_id.to_string(), byte_offset + byte_length);

        debug!(byte_offset, pad, "Buffer view written");
        Ok(BufferView {
            buffer_id: buffer_id.to_string(),
            byte_offset,
            byte_length,
        })
    }

    /// Flush every stream opened so far
    pub fn flush(&self) -> Result<(), GlbError> {
        self.streams.flush_all()?;
        Ok(())
    }
}

impl BufferWriter for ResourceWriter {
    fn buffer_uri(&self, buffer_id: &str) -> Result<Option<String>, GlbError> {
        self.generate_buffer_uri(buffer_id).map(Some)
    }

    fn buffer_offset(&self, buffer_id: &str) -> u64 {
        ResourceWriter::buffer_offset(self, buffer_id)
    }

    fn write_buffer_view_aligned(
        &mut self,
        buffer_id: &str,
        data: &[u8],
        alignment: u64,
    ) -> Result<BufferView, GlbError> {
        let stream = self.buffer_stream(buffer_id)?;
        self.append(buffer_id, &stream, data, alignment)
    }
}
