// SPDX-License-Identifier: MIT
use thiserror::Error;

use crate::ports::StreamError;

/// Errors raised while staging buffers or writing a container
#[derive(Debug, Error)]
pub enum GlbError {
    #[error("Stream unavailable for '{uri}': {source}")]
    StreamUnavailable {
        uri: String,
        #[source]
        source: StreamError,
    },

    /// The destination may hold a partial container when this is returned
    /// from `finalize`.
    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Invalid buffer id: {0:?}")]
    InvalidBufferId(String),

    #[error("Alignment must be a non-zero power of two, got {0}")]
    InvalidAlignment(u64),

    #[error("{chunk} length {len} does not fit the container's 32-bit length fields")]
    LengthOverflow { chunk: &'static str, len: u64 },

    #[error("Staging store holds {actual} bytes but {tracked} were tracked")]
    StagingMismatch { tracked: u64, actual: u64 },

    #[error("Container declared {declared} bytes but {written} were written")]
    LengthMismatch { declared: u64, written: u64 },

    #[error("Container already finalized")]
    AlreadyFinalized,
}
