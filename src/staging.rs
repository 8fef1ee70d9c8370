// SPDX-License-Identifier: MIT
//! Staging stores for the embedded buffer
//!
//! Embedded buffer content is accumulated here until the container is
//! finalized, then copied into the BIN chunk.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

/// Append-only sink holding the embedded buffer until finalize
pub trait StagingStore: Write + Send + 'static {
    /// Number of bytes staged so far
    fn staged_len(&mut self) -> io::Result<u64>;

    /// Copy every staged byte into `dest`, returning the count copied
    fn copy_to(&mut self, dest: &mut dyn Write) -> io::Result<u64>;
}

impl StagingStore for Vec<u8> {
    fn staged_len(&mut self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn copy_to(&mut self, dest: &mut dyn Write) -> io::Result<u64> {
        dest.write_all(self.as_slice())?;
        Ok(self.len() as u64)
    }
}

impl StagingStore for File {
    fn staged_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn copy_to(&mut self, dest: &mut dyn Write) -> io::Result<u64> {
        self.seek(SeekFrom::Start(0))?;
        let copied = io::copy(self, dest)?;
        // Leave the cursor at the end so later appends don't overwrite
        self.seek(SeekFrom::End(0))?;
        Ok(copied)
    }
}

/// Anonymous temp file for staging payloads too large to hold in memory
///
/// The file is removed by the OS once the writer drops it.
pub fn temp_file_store() -> io::Result<File> {
    tempfile::tempfile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_store() {
        let mut store: Vec<u8> = Vec::new();
        store.write_all(b"abc").unwrap();
        store.write_all(b"de").unwrap();

        assert_eq!(store.staged_len().unwrap(), 5);

        let mut out = Vec::new();
        assert_eq!(store.copy_to(&mut out).unwrap(), 5);
        assert_eq!(out, b"abcde");
    }

    #[test]
    fn test_temp_file_store() {
        let mut store = temp_file_store().unwrap();
        store.write_all(b"first").unwrap();

        let mut out = Vec::new();
        assert_eq!(store.copy_to(&mut out).unwrap(), 5);
        assert_eq!(out, b"first");

        // Appends after a copy continue at the end
        store.write_all(b"+more").unwrap();
        assert_eq!(store.staged_len().unwrap(), 10);

        let mut out = Vec::new();
        store.copy_to(&mut out).unwrap();
        assert_eq!(out, b"first+more");
    }
}
