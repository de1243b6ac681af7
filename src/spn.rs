//! 8-round substitution–permutation network over 256-byte blocks, with a
//! chained (seed-evolving) mode of operation.

use rand::RngCore;

use crate::crypto::KeyMaterial;
use crate::pbox::PBox;
use crate::sbox::SBox;

pub const BLOCK_LEN: usize = 256;
pub const ROUNDS: usize = 8;

pub type Block = [u8; BLOCK_LEN];

/// SPN engine: eight S-boxes, one P-box, and the mutable evolving seed.
pub struct Spn {
    s_boxes: [SBox; ROUNDS],
    p_box: PBox,
    seed: Block,
}

fn clamp_nonzero(seed: &mut Block) {
    for b in seed.iter_mut() {
        if *b == 0 {
            *b = 1;
        }
    }
}

impl Spn {
    /// Build an SPN engine from expanded key material and an explicit seed.
    /// Seed bytes must already be non-zero; callers that need a fresh random
    /// seed should use [`Self::with_random_seed`].
    pub fn with_seed(key: &KeyMaterial, mut seed: Block) -> Self {
        clamp_nonzero(&mut seed);
        let s_boxes: [SBox; ROUNDS] = std::array::from_fn(|i| SBox::new(key.sbox_key(i)));
        let p_box = PBox::new(key.pbox_key());
        Self { s_boxes, p_box, seed }
    }

    /// Build an SPN engine with a freshly randomized seed drawn from an
    /// OS-backed CSPRNG (never all-zero bytes).
    pub fn with_random_seed(key: &KeyMaterial) -> Self {
        let mut seed = [0u8; BLOCK_LEN];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        clamp_nonzero(&mut seed);
        Self::with_seed(key, seed)
    }

    pub fn seed(&self) -> &Block {
        &self.seed
    }

    pub fn set_seed(&mut self, mut seed: Block) {
        clamp_nonzero(&mut seed);
        self.seed = seed;
    }

    fn p_seed(&self) -> u8 {
        let sum: u32 = self.seed.iter().map(|&b| b as u32).sum();
        (sum % 256) as u8
    }

    fn encode_round(&self, plain: &Block, round: usize, p_seed: u8) -> Block {
        let mut mixed = [0u8; BLOCK_LEN];
        for i in 0..BLOCK_LEN {
            let s = self.seed[i];
            let mut t = plain[i] ^ self.s_boxes[round].encode(i as u8) ^ s;
            for j in 0..8 {
                if s & (1 << j) != 0 {
                    t = self.s_boxes[j].encode(t);
                }
            }
            mixed[i] = t;
        }
        self.p_box.block_encode(&mixed, p_seed)
    }

    fn decode_round(&self, cipher: &Block, round: usize, p_seed: u8) -> Block {
        let mixed = self.p_box.block_decode(cipher, p_seed);
        let mut out = [0u8; BLOCK_LEN];
        for i in 0..BLOCK_LEN {
            let s = self.seed[i];
            let mut t = mixed[i];
            for j in (0..8).rev() {
                if s & (1 << j) != 0 {
                    t = self.s_boxes[j].decode(t);
                }
            }
            t ^= self.s_boxes[round].encode(i as u8) ^ s;
            out[i] = t;
        }
        out
    }

    /// Encipher one 256-byte plaintext block, advancing the seed.
    pub fn encode_block(&mut self, plain: &Block) -> Block {
        let p_seed = self.p_seed();
        let mut block = self.encode_round(plain, 0, p_seed);
        for round in 1..ROUNDS {
            block = self.encode_round(&block, round, p_seed);
        }
        for i in 0..BLOCK_LEN {
            self.seed[i] ^= plain[i];
        }
        clamp_nonzero(&mut self.seed);
        block
    }

    /// Decipher one 256-byte ciphertext block, advancing the seed using the
    /// recovered plaintext so encoder and decoder stay synchronized.
    pub fn decode_block(&mut self, cipher: &Block) -> Block {
        let p_seed = self.p_seed();
        let mut block = self.decode_round(cipher, ROUNDS - 1, p_seed);
        for round in (0..ROUNDS - 1).rev() {
            block = self.decode_round(&block, round, p_seed);
        }
        for i in 0..BLOCK_LEN {
            self.seed[i] ^= block[i];
        }
        clamp_nonzero(&mut self.seed);
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pw: &[u8]) -> KeyMaterial {
        KeyMaterial::expand(pw).unwrap()
    }

    fn sample_block(seed: u8) -> Block {
        std::array::from_fn(|i| (i as u8).wrapping_mul(seed).wrapping_add(5))
    }

    #[test]
    fn round_trip_per_block_same_seed() {
        let km = key(b"correct horse battery staple");
        let seed0: Block = std::array::from_fn(|i| ((i as u8) | 1));
        let mut enc = Spn::with_seed(&km, seed0);
        let mut dec = Spn::with_seed(&km, seed0);
        let plain = sample_block(17);
        let cipher = enc.encode_block(&plain);
        let recovered = dec.decode_block(&cipher);
        assert_eq!(recovered, plain);
        assert_eq!(enc.seed(), dec.seed());
    }

    #[test]
    fn seed_avalanche_over_many_random_blocks() {
        let km = key(b"avalanche-key");
        let seed0: Block = std::array::from_fn(|i| ((i as u8) | 1));
        let mut rng = rand::rngs::OsRng;
        let mut diffs_total = 0usize;
        let trials = 32;
        for _ in 0..trials {
            let mut enc = Spn::with_seed(&km, seed0);
            let before = *enc.seed();
            let mut plain = [0u8; BLOCK_LEN];
            rng.fill_bytes(&mut plain);
            enc.encode_block(&plain);
            let after = *enc.seed();
            let diffs = before.iter().zip(after.iter()).filter(|(a, b)| a != b).count();
            diffs_total += diffs;
        }
        let avg = diffs_total as f64 / trials as f64;
        assert!(avg >= BLOCK_LEN as f64 * 0.25, "average diff {avg} too low");
    }

    #[test]
    fn deterministic_keying() {
        let km = key(b"same-password");
        let seed0: Block = std::array::from_fn(|i| ((i as u8).wrapping_add(3)) | 1);
        let plain = sample_block(99);
        let mut a = Spn::with_seed(&km, seed0);
        let mut b = Spn::with_seed(&km, seed0);
        assert_eq!(a.encode_block(&plain), b.encode_block(&plain));
    }

    #[test]
    fn different_ivs_diverge() {
        let km = key(b"iv-independence");
        let plain = sample_block(7);
        let mut a = Spn::with_random_seed(&km);
        let mut b = Spn::with_random_seed(&km);
        assert_ne!(a.encode_block(&plain), b.encode_block(&plain));
    }
}
