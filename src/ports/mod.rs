// SPDX-License-Identifier: MIT
mod stream_writer;

pub use stream_writer::{shared_stream, SharedStream, StreamError, StreamWriter};

#[cfg(test)]
pub use stream_writer::MockStreamWriter;
