//! Keyed bit→bit bijection over the 2048-bit (256-byte) block.

use crate::permute::build_maps;

pub const PBOX_WIDTH: usize = 2048;
pub const PBOX_BLOCK_BYTES: usize = PBOX_WIDTH / 8;

/// A permutation of `{0..2048}` bit positions, with precomputed encode and
/// decode tables.
#[derive(Clone)]
pub struct PBox {
    pub encode_map: [u16; PBOX_WIDTH],
    pub decode_map: [u16; PBOX_WIDTH],
}

impl PBox {
    /// Build a P-box from exactly [`PBOX_WIDTH`] key bytes.
    pub fn new(key: &[u8]) -> Self {
        assert_eq!(key.len(), PBOX_WIDTH);
        let (encode_map, decode_map) = build_maps(key);
        let mut e = [0u16; PBOX_WIDTH];
        let mut d = [0u16; PBOX_WIDTH];
        e.copy_from_slice(&encode_map);
        d.copy_from_slice(&decode_map);
        Self { encode_map: e, decode_map: d }
    }

    /// Bit-level transposition of a 256-byte block, rotated by `p_seed`.
    ///
    /// For each set input bit at byte `i`, bit `b`, the destination bit is
    /// `encode_map[(i*8 + p_seed + b) mod 2048]`.
    pub fn block_encode(&self, input: &[u8; PBOX_BLOCK_BYTES], p_seed: u8) -> [u8; PBOX_BLOCK_BYTES] {
        let mut out = [0u8; PBOX_BLOCK_BYTES];
        for i in 0..PBOX_BLOCK_BYTES {
            let byte = input[i];
            if byte == 0 {
                continue;
            }
            for b in 0..8usize {
                if byte & (1 << b) != 0 {
                    let src = (i * 8 + p_seed as usize + b) % PBOX_WIDTH;
                    let dst = self.encode_map[src] as usize;
                    out[dst / 8] |= 1 << (dst % 8);
                }
            }
        }
        out
    }

    /// Inverse of [`Self::block_encode`].
    ///
    /// For each set input bit at position `i*8 + b`, the destination bit is
    /// `(decode_map[i*8 + b] - p_seed) mod 2048`.
    pub fn block_decode(&self, input: &[u8; PBOX_BLOCK_BYTES], p_seed: u8) -> [u8; PBOX_BLOCK_BYTES] {
        let mut out = [0u8; PBOX_BLOCK_BYTES];
        for i in 0..PBOX_BLOCK_BYTES {
            let byte = input[i];
            if byte == 0 {
                continue;
            }
            for b in 0..8usize {
                if byte & (1 << b) != 0 {
                    let pos = i * 8 + b;
                    let raw = self.decode_map[pos] as i32 - p_seed as i32;
                    let dst = raw.rem_euclid(PBOX_WIDTH as i32) as usize;
                    out[dst / 8] |= 1 << (dst % 8);
                }
            }
        }
        out
    }
}
