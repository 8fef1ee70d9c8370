// SPDX-License-Identifier: MIT
#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Stream unavailable for '{uri}': {reason}")]
    Unavailable { uri: String, reason: String },
}

/// Writable stream shared between the resolver's cache and its users
pub type SharedStream = Arc<Mutex<dyn Write + Send>>;

/// Wrap a concrete writer as a [`SharedStream`]
pub fn shared_stream<W: Write + Send + 'static>(writer: W) -> SharedStream {
    Arc::new(Mutex::new(writer))
}

/// Port for resolving output streams by URI
#[cfg_attr(test, automock)]
pub trait StreamWriter: Send {
    /// Open (or create) the stream behind `uri`
    fn get_output_stream(&self, uri: &str) -> Result<SharedStream, StreamError>;
}
