//! Keyed byte→byte bijection over `{0..256}`.

use crate::permute::build_maps;

pub const SBOX_WIDTH: usize = 256;

/// A permutation of `{0..256}`, with precomputed encode and decode tables.
#[derive(Clone)]
pub struct SBox {
    pub encode_map: [u8; SBOX_WIDTH],
    pub decode_map: [u8; SBOX_WIDTH],
}

impl SBox {
    /// Build an S-box from exactly [`SBOX_WIDTH`] key bytes.
    pub fn new(key: &[u8]) -> Self {
        assert_eq!(key.len(), SBOX_WIDTH);
        let (encode_map, decode_map) = build_maps(key);
        let mut e = [0u8; SBOX_WIDTH];
        let mut d = [0u8; SBOX_WIDTH];
        for i in 0..SBOX_WIDTH {
            e[i] = encode_map[i] as u8;
            d[i] = decode_map[i] as u8;
        }
        Self { encode_map: e, decode_map: d }
    }

    pub fn encode(&self, x: u8) -> u8 {
        self.encode_map[x as usize]
    }

    pub fn decode(&self, y: u8) -> u8 {
        self.decode_map[y as usize]
    }
}
