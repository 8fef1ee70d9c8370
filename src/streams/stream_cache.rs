// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::ports::{SharedStream, StreamError, StreamWriter};

/// Caches resolved streams by URI so each URI is opened once
///
/// Repeated lookups return the same stream, which keeps per-buffer offset
/// tracking consistent with what was actually written.
pub struct StreamCache {
    writer: Box<dyn StreamWriter>,
    streams: HashMap<String, SharedStream>,
}

impl StreamCache {
    pub fn new<W: StreamWriter + 'static>(writer: W) -> Self {
        Self::from_boxed(Box::new(writer))
    }

    pub fn from_boxed(writer: Box<dyn StreamWriter>) -> Self {
        Self {
            writer,
            streams: HashMap::new(),
        }
    }

    /// Get the cached stream for `uri`, opening it on first use
    pub fn get(&mut self, uri: &str) -> Result<SharedStream, StreamError> {
        if let Some(stream) = self.streams.get(uri) {
            return Ok(Arc::clone(stream));
        }

        debug!("Resolving output stream: {}", uri);
        let stream = self.writer.get_output_stream(uri)?;
        self.streams.insert(uri.to_string(), Arc::clone(&stream));

        Ok(stream)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.streams.contains_key(uri)
    }

    /// Flush every cached stream
    pub fn flush_all(&self) -> std::io::Result<()> {
        for stream in self.streams.values() {
            stream.lock().flush()?;
        }
        Ok(())
    }
}
