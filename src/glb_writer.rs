// SPDX-License-Identifier: MIT
//! GLB resource writer
//!
//! Buffer views written to [`GLB_BUFFER_ID`] are staged in memory (or in a
//! temp file) and embedded in the container's BIN chunk. Every other buffer
//! id is handled by the base [`ResourceWriter`] and lands in its own external
//! stream.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::GlbError;
use crate::format::{ChunkType, ContainerLayout, GLB_CHUNK_ALIGNMENT};
use crate::ports::{SharedStream, StreamError, StreamWriter};
use crate::resource_writer::{BufferView, BufferWriter, ResourceWriter};
use crate::staging::StagingStore;
use crate::streams::StreamCache;

/// Reserved buffer id for the buffer embedded in the BIN chunk
pub const GLB_BUFFER_ID: &str = "binary_glTF";

/// Where a buffer id's bytes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget<'a> {
    /// The staging store, later copied into the BIN chunk
    Embedded,

    /// An external stream owned by the base writer
    Named(&'a str),
}

impl<'a> BufferTarget<'a> {
    pub fn from_id(buffer_id: &'a str) -> Self {
        if buffer_id == GLB_BUFFER_ID {
            BufferTarget::Embedded
        } else {
            BufferTarget::Named(buffer_id)
        }
    }
}

/// Builder for [`GlbResourceWriter`]
pub struct GlbResourceWriterBuilder<S = Vec<u8>> {
    streams: StreamCache,
    uri_prefix: String,
    staging: S,
}

impl GlbResourceWriterBuilder<Vec<u8>> {
    pub fn new(streams: StreamCache) -> Self {
        Self {
            streams,
            uri_prefix: String::new(),
            staging: Vec::new(),
        }
    }
}

impl<S: StagingStore> GlbResourceWriterBuilder<S> {
    /// Prefix for URIs generated for external buffers
    pub fn uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.uri_prefix = prefix.into();
        self
    }

    /// Replace the default in-memory staging store
    pub fn staging<T: StagingStore>(self, staging: T) -> GlbResourceWriterBuilder<T> {
        GlbResourceWriterBuilder {
            streams: self.streams,
            uri_prefix: self.uri_prefix,
            staging,
        }
    }

    pub fn build(self) -> GlbResourceWriter<S> {
        GlbResourceWriter {
            base: ResourceWriter::from_cache(self.streams).with_uri_prefix(self.uri_prefix),
            staging: Arc::new(Mutex::new(self.staging)),
            finalized: false,
            destination: None,
        }
    }
}

/// Resource writer producing a single GLB container
///
/// Not meant for concurrent use: the staging store and offset tracking are
/// plain mutable state behind `&mut self`.
pub struct GlbResourceWriter<S: StagingStore = Vec<u8>> {
    base: ResourceWriter,
    staging: Arc<Mutex<S>>,
    finalized: bool,
    destination: Option<String>,
}

impl GlbResourceWriter<Vec<u8>> {
    /// Writer with in-memory staging and no URI prefix
    pub fn new<W: StreamWriter + 'static>(writer: W) -> Self {
        Self::builder(writer).build()
    }

    pub fn builder<W: StreamWriter + 'static>(writer: W) -> GlbResourceWriterBuilder<Vec<u8>> {
        GlbResourceWriterBuilder::new(StreamCache::new(writer))
    }
}

impl<S: StagingStore> GlbResourceWriter<S> {
    /// Base writer handling external buffers
    pub fn base(&self) -> &ResourceWriter {
        &self.base
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// URI for a buffer, `None` for the embedded buffer
    pub fn buffer_uri(&self, buffer_id: &str) -> Result<Option<String>, GlbError> {
        match BufferTarget::from_id(buffer_id) {
            BufferTarget::Embedded => Ok(None),
            BufferTarget::Named(id) => self.base.generate_buffer_uri(id).map(Some),
        }
    }

    /// Stream a buffer's bytes are written to
    ///
    /// The embedded buffer always yields the same staging handle; named
    /// buffers yield the cached stream for their generated URI.
    pub fn buffer_stream(&mut self, buffer_id: &str) -> Result<SharedStream, GlbError> {
        match BufferTarget::from_id(buffer_id) {
            BufferTarget::Embedded => {
                let staging: SharedStream = self.staging.clone();
                Ok(staging)
            }
            BufferTarget::Named(id) => {
                let uri = self.base.generate_buffer_uri(id)?;
                if self.destination.as_deref() == Some(uri.as_str()) {
                    return Err(destination_conflict(&uri, "container already written here"));
                }
                self.base.resolve(&uri)
            }
        }
    }

    pub fn buffer_offset(&self, buffer_id: &str) -> u64 {
        self.base.buffer_offset(buffer_id)
    }

    /// Bytes staged for the BIN chunk so far
    pub fn staged_len(&self) -> u64 {
        self.base.buffer_offset(GLB_BUFFER_ID)
    }

    /// Write the container to `destination`
    ///
    /// Layout: 12-byte header, JSON chunk (manifest padded with spaces), BIN
    /// chunk (staged bytes padded with zeros). Returns the layout that was
    /// written.
    ///
    /// This is one-shot. A second call fails with
    /// [`GlbError::AlreadyFinalized`]. Failures detected before any output
    /// (destination unavailable, length overflow, staging mismatch) leave the
    /// writer usable. Once writing has started the writer counts as
    /// finalized; an I/O error from then on leaves a partial container at the
    /// destination and nothing here removes it.
    #[instrument(skip(self, manifest), fields(manifest_len = manifest.len()))]
    pub fn finalize(
        &mut self,
        manifest: &str,
        destination: &str,
    ) -> Result<ContainerLayout, GlbError> {
        if self.finalized {
            return Err(GlbError::AlreadyFinalized);
        }

        let tracked = self.staged_len();
        let actual = self.staging.lock().staged_len()?;
        if actual != tracked {
            return Err(GlbError::StagingMismatch { tracked, actual });
        }

        let layout = ContainerLayout::compute(manifest.len(), tracked)?;

        // A stream already open here belongs to an external buffer
        if self.base.is_open(destination) {
            return Err(destination_conflict(
                destination,
                "stream already holds an external buffer",
            ));
        }
        let stream = self.base.resolve(destination)?;

        self.finalized = true;
        self.destination = Some(destination.to_string());
        debug!(
            total_len = layout.total_len,
            json_padding = layout.json_padding,
            bin_padding = layout.bin_padding,
            "Writing container"
        );

        let written = {
            let mut guard = stream.lock();
            let mut out = CountingWriter::new(&mut *guard);
            let mut staging = self.staging.lock();
            write_container(&mut out, &layout, manifest.as_bytes(), &mut *staging)
                .inspect_err(|e| warn!("Container write to '{}' failed: {}", destination, e))?;
            out.flush()?;
            out.count()
        };

        if written != layout.total_len as u64 {
            return Err(GlbError::LengthMismatch {
                declared: layout.total_len as u64,
                written,
            });
        }

        // Flush external buffer streams as well
        self.base.flush()?;

        info!(
            destination,
            total_len = layout.total_len,
            "Container written"
        );
        Ok(layout)
    }
}

impl<S: StagingStore> BufferWriter for GlbResourceWriter<S> {
    fn buffer_uri(&self, buffer_id: &str) -> Result<Option<String>, GlbError> {
        GlbResourceWriter::buffer_uri(self, buffer_id)
    }

    fn buffer_offset(&self, buffer_id: &str) -> u64 {
        GlbResourceWriter::buffer_offset(self, buffer_id)
    }

    fn write_buffer_view_aligned(
        &mut self,
        buffer_id: &str,
        data: &[u8],
        alignment: u64,
    ) -> Result<BufferView, GlbError> {
        if self.finalized && BufferTarget::from_id(buffer_id) == BufferTarget::Embedded {
            return Err(GlbError::AlreadyFinalized);
        }

        let stream = self.buffer_stream(buffer_id)?;
        self.base.append(buffer_id, &stream, data, alignment)
    }
}

fn destination_conflict(uri: &str, reason: &str) -> GlbError {
    GlbError::StreamUnavailable {
        uri: uri.to_string(),
        source: StreamError::Unavailable {
            uri: uri.to_string(),
            reason: reason.to_string(),
        },
    }
}

/// Emit header, JSON chunk and BIN chunk in order
fn write_container<S: StagingStore>(
    out: &mut dyn Write,
    layout: &ContainerLayout,
    manifest: &[u8],
    staging: &mut S,
) -> Result<(), GlbError> {
    layout.header().write_to(out)?;

    layout.json_chunk_header().write_to(out)?;
    out.write_all(manifest)?;
    write_padding(out, ChunkType::Json, layout.json_padding)?;

    layout.bin_chunk_header().write_to(out)?;
    let copied = staging.copy_to(out)?;
    if copied != layout.bin_len as u64 {
        return Err(GlbError::StagingMismatch {
            tracked: layout.bin_len as u64,
            actual: copied,
        });
    }
    write_padding(out, ChunkType::Bin, layout.bin_padding)?;

    Ok(())
}

fn write_padding(out: &mut dyn Write, chunk_type: ChunkType, len: u32) -> io::Result<()> {
    if len > 0 {
        let pad = [chunk_type.padding_byte(); GLB_CHUNK_ALIGNMENT];
        out.write_all(&pad[..len as usize])?;
    }
    Ok(())
}

/// Counts bytes passed through to the inner writer
struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
