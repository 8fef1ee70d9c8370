// SPDX-License-Identifier: MIT
mod file_stream_writer;
mod memory_stream_writer;
mod stream_cache;

pub use file_stream_writer::FileStreamWriter;
pub use memory_stream_writer::MemoryStreamWriter;
pub use stream_cache::StreamCache;
