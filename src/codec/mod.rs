//! Streaming LZW-style dictionary codec with 16-bit codewords.
//!
//! The dictionary is keyed on `(prev_code, next_byte)` pairs rather than on
//! variable-length byte sequences — the standard LZW optimization, and
//! substantially cheaper per insert than a sequence-keyed map. The decode
//! side reconstructs a sequence only when it needs to emit one, by walking
//! the `(prev, byte)` chain back to a root byte and reversing it.

use std::collections::HashMap;
use thiserror::Error;

/// Dictionary entries start at 256 (one per byte value) and freeze at this
/// size; beyond it no further entries are added and the wire format drops
/// the trailing extension byte.
pub const MAX_DICT_SIZE: usize = 65536;
const INITIAL_DICT_SIZE: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("LZW code index out of range")]
    CorruptCode,
}

/// Streaming LZW compressor.
pub struct Compressor {
    extensions: HashMap<(u16, u8), u16>,
    size: usize,
    /// `None` means the currently matched sequence `w` is empty.
    current: Option<u16>,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor {
    pub fn new() -> Self {
        Self { extensions: HashMap::new(), size: INITIAL_DICT_SIZE, current: None }
    }

    /// Compress `data`, returning the bytes emitted so far. Any unmatched
    /// trailing sequence is buffered internally until a later call or
    /// [`Self::close`].
    pub fn compress(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for &c in data {
            match self.current {
                None => {
                    // w = ∅; w·c is always a pre-seeded single-byte entry.
                    self.current = Some(c as u16);
                }
                Some(w_code) => {
                    if let Some(&next) = self.extensions.get(&(w_code, c)) {
                        self.current = Some(next);
                    } else if self.size == MAX_DICT_SIZE {
                        out.extend_from_slice(&w_code.to_be_bytes());
                        self.current = Some(c as u16);
                    } else {
                        out.extend_from_slice(&w_code.to_be_bytes());
                        out.push(c);
                        self.extensions.insert((w_code, c), self.size as u16);
                        self.size += 1;
                        self.current = None;
                    }
                }
            }
        }
        out
    }

    /// Flush any buffered match as a final code (no extension byte).
    pub fn close(&mut self) -> Vec<u8> {
        match self.current.take() {
            Some(w_code) => w_code.to_be_bytes().to_vec(),
            None => Vec::new(),
        }
    }
}

/// One installed dictionary entry on the decode side: the code it extends
/// and the literal byte appended. Codes below 256 have no predecessor.
#[derive(Clone, Copy)]
struct DictEntry {
    prev: Option<u16>,
    byte: u8,
}

/// Streaming LZW decompressor.
pub struct Decompressor {
    entries: Vec<DictEntry>,
    buffer: Vec<u8>,
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor {
    pub fn new() -> Self {
        let entries = (0..INITIAL_DICT_SIZE)
            .map(|i| DictEntry { prev: None, byte: i as u8 })
            .collect();
        Self { entries, buffer: Vec::new() }
    }

    fn frozen(&self) -> bool {
        self.entries.len() == MAX_DICT_SIZE
    }

    fn resolve(&self, code: u16, out: &mut Vec<u8>) -> Result<(), CodecError> {
        if code as usize >= self.entries.len() {
            return Err(CodecError::CorruptCode);
        }
        let start = out.len();
        let mut cur = code;
        loop {
            let entry = self.entries[cur as usize];
            out.push(entry.byte);
            match entry.prev {
                Some(p) => cur = p,
                None => break,
            }
        }
        out[start..].reverse();
        Ok(())
    }

    /// Decompress `data`, buffering any trailing partial unit for the next
    /// call.
    pub fn decompress(&mut self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.buffer.extend_from_slice(data);
        let mut out = Vec::new();
        let mut cursor = 0usize;

        loop {
            let unit_len = if self.frozen() { 2 } else { 3 };
            if self.buffer.len() - cursor < unit_len {
                break;
            }
            let code = u16::from_be_bytes([self.buffer[cursor], self.buffer[cursor + 1]]);

            if self.frozen() {
                self.resolve(code, &mut out)?;
                cursor += 2;
            } else {
                let ext = self.buffer[cursor + 2];
                self.resolve(code, &mut out)?;
                out.push(ext);
                self.entries.push(DictEntry { prev: Some(code), byte: ext });
                cursor += 3;
            }
        }

        self.buffer.drain(..cursor);
        Ok(out)
    }

    /// Equivalent to `decompress(&[])`; present for symmetry with
    /// [`Compressor::close`]. There is nothing to flush: every unit the
    /// compressor ever emits is a complete, self-contained codeword.
    pub fn close(&mut self) -> Result<Vec<u8>, CodecError> {
        self.decompress(&[])
    }
}
