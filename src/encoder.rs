//! Streaming byte-interface facade over [`crate::spn::Spn`]: emits/consumes
//! the cleartext initial seed, drains 256-byte blocks, and pads the final
//! block on close.

use rand::RngCore;
use thiserror::Error;

use crate::crypto::KeyMaterial;
use crate::spn::{Block, Spn, BLOCK_LEN};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("cipher stream is not a multiple of 256 bytes past the initial seed")]
    TruncatedStream,
}

/// Wraps [`Spn`] in a streaming encoder: arbitrary-length input in, a
/// cleartext 256-byte seed prefix followed by ciphertext blocks out.
pub struct Encoder {
    spn: Spn,
    buffer: Vec<u8>,
    seed_emitted: bool,
}

impl Encoder {
    pub fn new(key: &KeyMaterial) -> Self {
        Self { spn: Spn::with_random_seed(key), buffer: Vec::new(), seed_emitted: false }
    }

    /// Feed more plaintext; returns ciphertext (and, on the first call, the
    /// cleartext IV) produced so far.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.seed_emitted {
            out.extend_from_slice(self.spn.seed());
            self.seed_emitted = true;
        }
        self.buffer.extend_from_slice(data);

        let mut offset = 0;
        while self.buffer.len() - offset >= BLOCK_LEN {
            let mut block: Block = [0u8; BLOCK_LEN];
            block.copy_from_slice(&self.buffer[offset..offset + BLOCK_LEN]);
            out.extend_from_slice(&self.spn.encode_block(&block));
            offset += BLOCK_LEN;
        }
        self.buffer.drain(..offset);
        out
    }

    /// Pad the remaining buffer with cryptographically random bytes up to a
    /// full block, encipher it, and emit it. Always emits the IV first if
    /// [`Self::encode`] was never called.
    pub fn close(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.seed_emitted {
            out.extend_from_slice(self.spn.seed());
            self.seed_emitted = true;
        }
        let mut block: Block = [0u8; BLOCK_LEN];
        let real = self.buffer.len();
        block[..real].copy_from_slice(&self.buffer);
        rand::rngs::OsRng.fill_bytes(&mut block[real..]);
        self.buffer.clear();
        out.extend_from_slice(&self.spn.encode_block(&block));
        out
    }
}

/// Wraps [`Spn`] in a streaming decoder: installs the IV from the first 256
/// bytes received, then deciphers subsequent 256-byte blocks.
pub struct Decoder {
    key: KeyMaterial,
    spn: Option<Spn>,
    buffer: Vec<u8>,
}

impl Decoder {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key, spn: None, buffer: Vec::new() }
    }

    /// Feed more ciphertext (including, on the first call, the IV prefix);
    /// returns plaintext blocks deciphered so far.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.buffer.extend_from_slice(data);
        let mut out = Vec::new();
        let mut offset = 0;

        if self.spn.is_none() {
            if self.buffer.len() - offset < BLOCK_LEN {
                self.buffer.drain(..offset);
                return Ok(out);
            }
            let mut seed: Block = [0u8; BLOCK_LEN];
            seed.copy_from_slice(&self.buffer[offset..offset + BLOCK_LEN]);
            self.spn = Some(Spn::with_seed(&self.key, seed));
            offset += BLOCK_LEN;
        }

        let spn = self.spn.as_mut().expect("seed installed above");
        while self.buffer.len() - offset >= BLOCK_LEN {
            let mut block: Block = [0u8; BLOCK_LEN];
            block.copy_from_slice(&self.buffer[offset..offset + BLOCK_LEN]);
            out.extend_from_slice(&spn.decode_block(&block));
            offset += BLOCK_LEN;
        }
        self.buffer.drain(..offset);
        Ok(out)
    }

    /// No-op: any leftover bytes are over-produced random padding, which
    /// [`crate::archiver::Dearchiver`] discards via its end-of-archive
    /// sentinel rather than via a cipher-level length field. A non-empty,
    /// non-block-multiple residue here (with the seed already installed) is
    /// still flagged, since it indicates a cipher stream that was corrupted
    /// or truncated mid-block rather than merely padded.
    pub fn close(&self) -> Result<(), StreamError> {
        if !self.buffer.is_empty() {
            return Err(StreamError::TruncatedStream);
        }
        Ok(())
    }
}
