//! Crate-wide error type.
//!
//! Each stage owns a narrow error enum (`archiver::ArchiveError`,
//! `codec::CodecError`, `encoder::StreamError`, `crypto::KeyError`); this
//! module unifies them behind one type so the pipeline driver and the CLI
//! have a single `Result` to propagate.

use thiserror::Error;

use crate::archiver::ArchiveError;
use crate::codec::CodecError;
use crate::crypto::KeyError;
use crate::encoder::StreamError;

/// Unified error type for the vault pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type Result<T> = std::result::Result<T, Error>;
