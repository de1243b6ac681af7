//! Password → key-material expansion.
//!
//! The cipher is bespoke and makes no KDF-strength claim; key derivation is
//! deliberately simple (cyclic repetition), matching the construction this
//! crate implements rather than the AES-GCM/Argon2id pairing a general
//! purpose container format would reach for.

use thiserror::Error;

/// Total expanded key length: 8 S-box key slices (256 bytes each) followed
/// by one P-box key slice (2048 bytes).
pub const KEY_MATERIAL_LEN: usize = 8 * 256 + 2048;

/// S-box key slice width.
pub const SBOX_KEY_LEN: usize = 256;

/// P-box key slice width.
pub const PBOX_KEY_LEN: usize = 2048;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("password must not be empty")]
    BadKeyMaterial,
}

/// Expanded key material, partitioned into the slices each SPN component
/// consumes.
pub struct KeyMaterial {
    bytes: [u8; KEY_MATERIAL_LEN],
}

impl KeyMaterial {
    /// Expand `password` cyclically to [`KEY_MATERIAL_LEN`] bytes.
    ///
    /// # Errors
    /// Returns [`KeyError::BadKeyMaterial`] if `password` is empty.
    pub fn expand(password: &[u8]) -> Result<Self, KeyError> {
        if password.is_empty() {
            return Err(KeyError::BadKeyMaterial);
        }
        let mut bytes = [0u8; KEY_MATERIAL_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = password[i % password.len()];
        }
        Ok(Self { bytes })
    }

    /// The key slice for S-box `index` (0..8).
    pub fn sbox_key(&self, index: usize) -> &[u8] {
        let start = index * SBOX_KEY_LEN;
        &self.bytes[start..start + SBOX_KEY_LEN]
    }

    /// The key slice for the P-box.
    pub fn pbox_key(&self) -> &[u8] {
        let start = 8 * SBOX_KEY_LEN;
        &self.bytes[start..start + PBOX_KEY_LEN]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_password() {
        assert!(matches!(KeyMaterial::expand(b""), Err(KeyError::BadKeyMaterial)));
    }

    #[test]
    fn expands_single_byte_password_cyclically() {
        let km = KeyMaterial::expand(b"x").unwrap();
        assert!(km.sbox_key(0).iter().all(|&b| b == b'x'));
        assert!(km.pbox_key().iter().all(|&b| b == b'x'));
    }

    #[test]
    fn partitions_are_contiguous_and_full_width() {
        let km = KeyMaterial::expand(b"hunter2").unwrap();
        for i in 0..8 {
            assert_eq!(km.sbox_key(i).len(), SBOX_KEY_LEN);
        }
        assert_eq!(km.pbox_key().len(), PBOX_KEY_LEN);
    }
}
