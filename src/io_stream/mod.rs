//! Buffered sequential + seekable read/write over a file.
//!
//! A deliberately simple byte-stream abstraction — the pipeline's only
//! collaborator below the archiver/codec/cipher stages, kept thin since it
//! carries no format-specific knowledge of its own.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Buffered sequential reader over a file, with seek support.
pub struct ByteReader {
    inner: BufReader<File>,
}

impl ByteReader {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self { inner: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, File::open(path)?) })
    }

    /// Read up to `size` bytes; returns fewer (including zero) at EOF.
    pub fn read_chunk(&mut self, size: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; size];
        let mut total = 0;
        while total < size {
            let n = self.inner.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        buf.truncate(total);
        Ok(buf)
    }

    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }
}

/// Buffered writer over a file, creating intermediate directories as needed.
pub struct ByteWriter {
    inner: BufWriter<File>,
}

impl ByteWriter {
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { inner: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, File::create(path)?) })
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_then_reads_back_in_chunks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.bin");
        let mut writer = ByteWriter::create(&path).unwrap();
        writer.write(b"0123456789").unwrap();
        writer.flush().unwrap();

        let mut reader = ByteReader::open(&path).unwrap();
        let first = reader.read_chunk(4).unwrap();
        let rest = reader.read_chunk(100).unwrap();
        assert_eq!(first, b"0123");
        assert_eq!(rest, b"456789");
    }

    #[test]
    fn seek_repositions_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seek.bin");
        let mut writer = ByteWriter::create(&path).unwrap();
        writer.write(b"abcdefgh").unwrap();
        writer.flush().unwrap();

        let mut reader = ByteReader::open(&path).unwrap();
        reader.seek(4).unwrap();
        assert_eq!(reader.read_chunk(4).unwrap(), b"efgh");
    }
}
