//! # vaultcy — streaming archiver, LZW compressor, and keyed SPN cipher
//!
//! Pipeline: files → [`archiver`] frames → [`codec`] compresses →
//! [`encoder`] enciphers under a password-derived key ([`crypto`]), and
//! back. [`pipeline`] wires the stages together; [`pipeline::Vault`] is
//! the single entry point most callers want.

pub mod archiver;
pub mod codec;
pub mod crypto;
pub mod encoder;
pub mod error;
pub mod io_stream;
pub mod pbox;
pub mod permute;
pub mod pipeline;
pub mod sbox;
pub mod spn;

pub use crypto::{KeyError, KeyMaterial};
pub use error::{Error, Result};
pub use pipeline::{decode_container, encode_path, Vault};
