// SPDX-License-Identifier: MIT
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ports::{SharedStream, StreamError, StreamWriter};

#[derive(Default)]
struct MemoryState {
    buffers: HashMap<String, Arc<Mutex<Vec<u8>>>>,
    refused: HashSet<String>,
}

/// In-memory stream writer
///
/// Clones share the same buffers, so a handle kept by the caller can inspect
/// what was written through a clone handed to a resource writer.
#[derive(Clone, Default)]
pub struct MemoryStreamWriter {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_output_stream` fail for `uri`
    pub fn refuse(&self, uri: impl Into<String>) {
        self.state.lock().refused.insert(uri.into());
    }

    /// Bytes written so far to `uri`, if it was ever opened
    pub fn contents(&self, uri: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state.buffers.get(uri).map(|buffer| buffer.lock().clone())
    }

    /// URIs opened so far, sorted
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.state.lock().buffers.keys().cloned().collect();
        uris.sort();
        uris
    }
}

impl StreamWriter for MemoryStreamWriter {
    fn get_output_stream(&self, uri: &str) -> Result<SharedStream, StreamError> {
        let mut state = self.state.lock();
        if state.refused.contains(uri) {
            return Err(StreamError::Unavailable {
                uri: uri.to_string(),
                reason: "refused by memory stream writer".to_string(),
            });
        }

        // Opening truncates, like creating a file
        let buffer = Arc::new(Mutex::new(Vec::new()));
        state.buffers.insert(uri.to_string(), Arc::clone(&buffer));

        let stream: SharedStream = buffer;
        Ok(stream)
    }
}
