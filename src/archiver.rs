//! Flatten a filesystem subtree into a framed byte stream, and back.
//!
//! Frame format per file: `[path_len: u16 BE][path bytes][size: u64 BE][payload]`.
//! Path bytes are carried raw end to end — a path component is whatever
//! bytes the filesystem handed back, not necessarily valid UTF-8 — so they
//! round-trip exactly rather than through a lossy `String` conversion.
//! The worklist is a depth-first expansion seeded with the root's immediate
//! entries (or the root itself, if it names a file); emitted paths are
//! relative to the root's parent, so the root's own name is the first path
//! component.
//!
//! Once the worklist drains, [`Archiver::read`] emits a single sentinel
//! frame — a path length of zero, nothing else — then returns empty chunks
//! forever. [`Dearchiver`] treats that sentinel as the authoritative
//! end-of-archive marker; see `DESIGN.md` for why this is necessary.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const READ_CHUNK: usize = 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("archive frame incomplete at end of stream")]
    TruncatedArchive,
}

struct WorklistEntry {
    rel_path: Vec<u8>,
    fs_path: PathBuf,
}

enum Current {
    None,
    Header { rel_path: Vec<u8>, fs_path: PathBuf },
    Body { file: fs::File, fs_path: PathBuf, remaining: u64 },
}

/// Append `child` to `prefix` with a `/` separator, at the byte level —
/// path components are arbitrary bytes on Linux, not guaranteed UTF-8.
fn join_rel(prefix: &[u8], child: &OsStr) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + 1 + child.len());
    out.extend_from_slice(prefix);
    out.push(b'/');
    out.extend_from_slice(child.as_bytes());
    out
}

/// Flattens a root path (file or directory) into a framed byte stream.
pub struct Archiver {
    worklist: Vec<WorklistEntry>,
    current: Current,
    delete_after_read: bool,
    sentinel_emitted: bool,
}

impl Archiver {
    pub fn new(root: &Path) -> io::Result<Self> {
        Self::with_delete_after_read(root, false)
    }

    pub fn with_delete_after_read(root: &Path, delete_after_read: bool) -> io::Result<Self> {
        let name: Vec<u8> = root
            .file_name()
            .unwrap_or_else(|| root.as_os_str())
            .as_bytes()
            .to_vec();

        let mut worklist = Vec::new();
        if root.is_dir() {
            let mut children: Vec<_> = fs::read_dir(root)?.collect::<Result<_, _>>()?;
            children.sort_by_key(|e| e.file_name());
            // Worklist is popped LIFO; push in reverse so files are
            // processed in ascending listing order.
            for child in children.into_iter().rev() {
                worklist.push(WorklistEntry {
                    rel_path: join_rel(&name, &child.file_name()),
                    fs_path: child.path(),
                });
            }
        } else {
            worklist.push(WorklistEntry { rel_path: name, fs_path: root.to_path_buf() });
        }

        Ok(Self { worklist, current: Current::None, delete_after_read, sentinel_emitted: false })
    }

    /// Return the next chunk of the framed stream. An empty chunk after the
    /// sentinel has been emitted means true end-of-stream.
    pub fn read(&mut self) -> io::Result<Vec<u8>> {
        loop {
            match std::mem::replace(&mut self.current, Current::None) {
                Current::None => {
                    if let Some(entry) = self.pop_next_file() {
                        self.current = Current::Header { rel_path: entry.rel_path, fs_path: entry.fs_path };
                        continue;
                    }
                    if !self.sentinel_emitted {
                        self.sentinel_emitted = true;
                        return Ok(vec![0u8, 0u8]);
                    }
                    return Ok(Vec::new());
                }
                Current::Header { rel_path, fs_path } => {
                    let size = fs::metadata(&fs_path)?.len();
                    let mut out = Vec::with_capacity(2 + rel_path.len() + 8);
                    out.extend_from_slice(&(rel_path.len() as u16).to_be_bytes());
                    out.extend_from_slice(&rel_path);
                    out.extend_from_slice(&size.to_be_bytes());
                    let file = fs::File::open(&fs_path)?;
                    self.current = Current::Body { file, fs_path, remaining: size };
                    return Ok(out);
                }
                Current::Body { mut file, fs_path, remaining } => {
                    if remaining == 0 {
                        self.finish_body(&fs_path)?;
                        continue;
                    }
                    let want = READ_CHUNK.min(remaining as usize);
                    let mut buf = vec![0u8; want];
                    let n = file.read(&mut buf)?;
                    buf.truncate(n);
                    let left = remaining - n as u64;
                    if n == 0 || left == 0 {
                        self.current = Current::None;
                        self.finish_body(&fs_path)?;
                    } else {
                        self.current = Current::Body { file, fs_path, remaining: left };
                    }
                    return Ok(buf);
                }
            }
        }
    }

    fn finish_body(&mut self, fs_path: &Path) -> io::Result<()> {
        if self.delete_after_read {
            fs::remove_file(fs_path)?;
        }
        Ok(())
    }

    /// Pop the next worklist entry that is a file, expanding directories
    /// in place as they're encountered.
    fn pop_next_file(&mut self) -> Option<WorklistEntry> {
        while let Some(entry) = self.worklist.pop() {
            if entry.fs_path.is_dir() {
                if let Ok(mut children) = fs::read_dir(&entry.fs_path).map(|rd| rd.collect::<Result<Vec<_>, _>>()) {
                    if let Ok(children) = children.as_mut() {
                        children.sort_by_key(|e| e.file_name());
                        for child in children.iter().rev() {
                            self.worklist.push(WorklistEntry {
                                rel_path: join_rel(&entry.rel_path, &child.file_name()),
                                fs_path: child.path(),
                            });
                        }
                    }
                }
                continue;
            }
            return Some(entry);
        }
        None
    }
}

enum DearchiverState {
    HdrLen,
    HdrPath { len: usize },
    HdrSize { path: Vec<u8> },
    Payload { remaining: u64 },
    Done,
}

/// Consumes a framed byte stream and reconstructs files under `root`.
pub struct Dearchiver {
    root: PathBuf,
    state: DearchiverState,
    buffer: Vec<u8>,
    writer: Option<fs::File>,
}

impl Dearchiver {
    pub fn new(root: PathBuf) -> Self {
        Self { root, state: DearchiverState::HdrLen, buffer: Vec::new(), writer: None }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, DearchiverState::Done)
    }

    /// Feed more bytes from the decompressed stream. Once [`Self::is_done`]
    /// is true this is a no-op — callers are expected to stop feeding bytes
    /// at that point rather than rely on this to discard them, but it is
    /// safe to call regardless.
    pub fn write(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        if self.is_done() {
            return Ok(());
        }
        self.buffer.extend_from_slice(data);
        self.drive()
    }

    /// Assert end-of-archive was reached cleanly. Call once the decoded
    /// stream is fully exhausted.
    pub fn finish(&self) -> Result<(), ArchiveError> {
        if self.is_done() {
            Ok(())
        } else {
            Err(ArchiveError::TruncatedArchive)
        }
    }

    fn drive(&mut self) -> Result<(), ArchiveError> {
        loop {
            match &self.state {
                DearchiverState::HdrLen => {
                    if self.buffer.len() < 2 {
                        return Ok(());
                    }
                    let len = u16::from_be_bytes([self.buffer[0], self.buffer[1]]) as usize;
                    self.buffer.drain(..2);
                    if len == 0 {
                        self.state = DearchiverState::Done;
                        return Ok(());
                    }
                    self.state = DearchiverState::HdrPath { len };
                }
                DearchiverState::HdrPath { len } => {
                    let len = *len;
                    if self.buffer.len() < len {
                        return Ok(());
                    }
                    let path: Vec<u8> = self.buffer[..len].to_vec();
                    self.buffer.drain(..len);
                    self.state = DearchiverState::HdrSize { path };
                }
                DearchiverState::HdrSize { path } => {
                    if self.buffer.len() < 8 {
                        return Ok(());
                    }
                    let mut size_bytes = [0u8; 8];
                    size_bytes.copy_from_slice(&self.buffer[..8]);
                    let size = u64::from_be_bytes(size_bytes);
                    self.buffer.drain(..8);

                    let dest = self.root.join(normalize_path(path));
                    if let Some(parent) = dest.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    self.writer = Some(fs::File::create(&dest)?);
                    self.state = DearchiverState::Payload { remaining: size };
                }
                DearchiverState::Payload { remaining } => {
                    let remaining = *remaining;
                    if remaining == 0 {
                        self.writer = None;
                        self.state = DearchiverState::HdrLen;
                        continue;
                    }
                    let take = (self.buffer.len() as u64).min(remaining) as usize;
                    if take == 0 {
                        return Ok(());
                    }
                    let chunk: Vec<u8> = self.buffer.drain(..take).collect();
                    self.writer.as_mut().expect("writer open during payload").write_all(&chunk)?;
                    let left = remaining - take as u64;
                    if left == 0 {
                        self.writer = None;
                        self.state = DearchiverState::HdrLen;
                    } else {
                        self.state = DearchiverState::Payload { remaining: left };
                    }
                }
                DearchiverState::Done => return Ok(()),
            }
        }
    }
}

/// Archive paths always use `/`; normalize to the host separator when
/// joining against a real filesystem root. Components are carried as raw
/// bytes end to end, since paths are not guaranteed to be valid UTF-8.
fn normalize_path(path: Vec<u8>) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.split(|&b| b == b'/') {
        out.push(OsStr::from_bytes(component));
    }
    out
}
