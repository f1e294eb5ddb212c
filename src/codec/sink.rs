// src/codec/sink.rs
//! Byte sink abstraction over the trace destination
//!
//! The serializer only needs sequential writes and absolute seeks, so the
//! sink surface is kept to exactly that. `FileSink` is the production
//! implementation; tests inject in-memory and fault-injecting sinks.

use crate::utils::errors::{CodecError, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Destination for serialized trace bytes
pub trait ByteSink {
    /// Write bytes at the current cursor, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Reposition the write cursor to an absolute offset.
    fn seek(&mut self, offset: u64) -> Result<()>;
}

/// File-backed byte sink
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open (and truncate) the file at `path` for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            CodecError::OpenFailed(format!("failed to open {}: {}", path.display(), e))
        })?;

        debug!("Opened trace sink at {}", path.display());

        Ok(Self { file })
    }
}

impl ByteSink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.file
            .write(bytes)
            .map_err(|e| CodecError::WriteFailed(e.to_string()))
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| CodecError::SeekFailed(e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{MemorySink, SharedBuffer, ShortSink};
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_write_and_seek() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.bin");

        let mut sink = FileSink::create(&path).unwrap();
        assert_eq!(sink.write(b"abcdef").unwrap(), 6);

        // Overwrite the middle in place, then extend at the end.
        sink.seek(2).unwrap();
        assert_eq!(sink.write(b"XY").unwrap(), 2);
        sink.seek(6).unwrap();
        assert_eq!(sink.write(b"!").unwrap(), 1);
        drop(sink);

        assert_eq!(std::fs::read(&path).unwrap(), b"abXYef!");
    }

    #[test]
    fn test_file_sink_open_failure() {
        let result = FileSink::create("/definitely/not/a/real/dir/sink.bin");
        assert!(matches!(result, Err(CodecError::OpenFailed(_))));
    }

    #[test]
    fn test_memory_sink_backpatch() {
        let buffer = SharedBuffer::new();
        let mut sink = MemorySink::new(buffer.clone());

        sink.write(b"0000tail").unwrap();
        sink.seek(0).unwrap();
        sink.write(b"head").unwrap();

        assert_eq!(buffer.bytes(), b"headtail");
    }

    #[test]
    fn test_short_sink_exhausts_budget() {
        let buffer = SharedBuffer::new();
        let mut sink = ShortSink::new(buffer.clone(), 5);

        assert_eq!(sink.write(b"abc").unwrap(), 3);
        assert_eq!(sink.write(b"defg").unwrap(), 2);
        assert_eq!(sink.write(b"hij").unwrap(), 0);
        assert_eq!(buffer.bytes(), b"abcde");
    }
}
