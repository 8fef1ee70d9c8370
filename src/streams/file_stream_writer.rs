// SPDX-License-Identifier: MIT
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::ports::{shared_stream, SharedStream, StreamError, StreamWriter};

/// Stream writer that maps URIs to files under a root directory
pub struct FileStreamWriter {
    root: PathBuf,
    create_dirs: bool,
}

impl FileStreamWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, true)
    }

    pub fn with_options(root: impl Into<PathBuf>, create_dirs: bool) -> Self {
        Self {
            root: root.into(),
            create_dirs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `uri` to a path under the root: /root/{uri}
    ///
    /// Rejects empty URIs, absolute paths and anything climbing out of the root.
    pub fn resolve_path(&self, uri: &str) -> Result<PathBuf, StreamError> {
        let unavailable = |reason: &str| StreamError::Unavailable {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        if uri.is_empty() {
            return Err(unavailable("empty uri"));
        }

        let relative = Path::new(uri);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(unavailable("uri escapes the output root")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(unavailable("absolute uri not allowed"))
                }
            }
        }

        Ok(self.root.join(relative))
    }
}

impl StreamWriter for FileStreamWriter {
    fn get_output_stream(&self, uri: &str) -> Result<SharedStream, StreamError> {
        let path = self.resolve_path(uri)?;

        if self.create_dirs {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| StreamError::Unavailable {
                    uri: uri.to_string(),
                    reason: format!("failed to create {:?}: {}", parent, e),
                })?;
            }
        }

        debug!("Opening output file: {:?}", path);
        let file = File::create(&path).map_err(|e| StreamError::Unavailable {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        Ok(shared_stream(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_path_nested() {
        let writer = FileStreamWriter::new("/data/out");
        assert_eq!(writer.root(), Path::new("/data/out"));
        let path = writer.resolve_path("models/scene.glb").unwrap();
        assert_eq!(path, PathBuf::from("/data/out/models/scene.glb"));
    }

    #[test]
    fn test_resolve_path_rejects_escape() {
        let writer = FileStreamWriter::new("/data/out");

        assert!(writer.resolve_path("").is_err());
        assert!(writer.resolve_path("../secret.bin").is_err());
        assert!(writer.resolve_path("/etc/passwd").is_err());
    }

    #[test]
    fn test_stream_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileStreamWriter::new(dir.path());

        let stream = writer.get_output_stream("nested/buffer.bin").unwrap();
        {
            let mut guard = stream.lock();
            guard.write_all(b"abc").unwrap();
            guard.flush().unwrap();
        }

        let written = fs::read(dir.path().join("nested/buffer.bin")).unwrap();
        assert_eq!(written, b"abc");
    }

    #[test]
    fn test_missing_dir_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileStreamWriter::with_options(dir.path(), false);

        let result = writer.get_output_stream("missing/scene.glb");
        assert!(matches!(result, Err(StreamError::Unavailable { .. })));
    }
}
