//! Chains Archiver → Compressor → Encoder (encode) and its inverse
//! (decode), and exposes the crate's single high-level facade, [`Vault`].

use std::path::Path;

use crate::archiver::{Archiver, Dearchiver};
use crate::codec::{Compressor, Decompressor};
use crate::crypto::KeyMaterial;
use crate::encoder::{Decoder, Encoder};
use crate::error::Result;
use crate::io_stream::{ByteReader, ByteWriter};
use crate::spn::BLOCK_LEN;

/// Encode `root` (a file or directory) into the container at `out_path`,
/// under `password`. When `delete_after_read` is set, each source file is
/// removed once its contents have been fully read into the pipeline.
pub fn encode_path(root: &Path, password: &[u8], out_path: &Path, delete_after_read: bool) -> Result<()> {
    let key = KeyMaterial::expand(password)?;
    let mut archiver = Archiver::with_delete_after_read(root, delete_after_read)?;
    let mut compressor = Compressor::new();
    let mut encoder = Encoder::new(&key);
    let mut writer = ByteWriter::create(out_path)?;

    loop {
        let chunk = archiver.read()?;
        let eof = chunk.is_empty();
        let compressed = compressor.compress(&chunk);
        let cipher = encoder.encode(&compressed);
        writer.write(&cipher)?;
        if eof {
            break;
        }
    }

    let tail = compressor.close();
    let cipher = encoder.encode(&tail);
    writer.write(&cipher)?;
    let final_block = encoder.close();
    writer.write(&final_block)?;
    writer.flush()?;
    Ok(())
}

/// Decode the container at `in_path` under `password`, restoring files
/// under `out_dir`.
///
/// Ciphertext blocks are read one 256-byte block at a time with a
/// one-block lookahead: every block except the last is known to contain
/// only real data and is fed through whole; the last block may contain
/// random padding appended after the true end of the compressed stream
/// (see `archiver` module docs), so it is fed to the decompressor one byte
/// at a time, stopping the instant the [`Dearchiver`] reports it has seen
/// the end-of-archive sentinel.
pub fn decode_container(in_path: &Path, password: &[u8], out_dir: &Path) -> Result<()> {
    let key = KeyMaterial::expand(password)?;
    let mut reader = ByteReader::open(in_path)?;
    let mut decoder = Decoder::new(key);
    let mut decompressor = Decompressor::new();
    let mut dearchiver = Dearchiver::new(out_dir.to_path_buf());

    let mut pending: Option<Vec<u8>> = None;
    loop {
        let raw = reader.read_chunk(BLOCK_LEN)?;
        if raw.is_empty() {
            break;
        }
        let decoded = decoder.decode(&raw)?;
        if decoded.is_empty() {
            // Either the seed was just installed, or (for a corrupted
            // container) a short trailing chunk is buffered internally;
            // decoder.close() below surfaces the latter.
            continue;
        }
        if let Some(prev) = pending.take() {
            feed_whole_block(&prev, &mut decompressor, &mut dearchiver)?;
        }
        pending = Some(decoded);
    }

    if let Some(last) = pending {
        feed_byte_at_a_time(&last, &mut decompressor, &mut dearchiver)?;
    }

    decoder.close()?;
    dearchiver.finish()?;
    Ok(())
}

fn feed_whole_block(block: &[u8], decompressor: &mut Decompressor, dearchiver: &mut Dearchiver) -> Result<()> {
    let decompressed = decompressor.decompress(block)?;
    dearchiver.write(&decompressed)?;
    Ok(())
}

fn feed_byte_at_a_time(block: &[u8], decompressor: &mut Decompressor, dearchiver: &mut Dearchiver) -> Result<()> {
    for &byte in block {
        if dearchiver.is_done() {
            break;
        }
        let decompressed = decompressor.decompress(&[byte])?;
        dearchiver.write(&decompressed)?;
    }
    Ok(())
}

/// High-level facade bundling [`encode_path`]/[`decode_container`].
pub struct Vault;

impl Vault {
    pub fn encode(root: &Path, password: &[u8], out_path: &Path, delete_after_read: bool) -> Result<()> {
        encode_path(root, password, out_path, delete_after_read)
    }

    pub fn decode(in_path: &Path, password: &[u8], out_dir: &Path) -> Result<()> {
        decode_container(in_path, password, out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn round_trips_hello_world() {
        let src = tempdir().unwrap();
        let file = src.path().join("hello.txt");
        fs::write(&file, b"hello\n").unwrap();

        let container = src.path().join("hello.vlt");
        Vault::encode(&file, b"pw", &container, false).unwrap();
        assert!(fs::metadata(&container).unwrap().len() > BLOCK_LEN as u64);

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("hello.txt")).unwrap(), b"hello\n");
    }

    #[test]
    fn round_trips_empty_file() {
        let src = tempdir().unwrap();
        let file = src.path().join("empty.txt");
        fs::write(&file, b"").unwrap();

        let container = src.path().join("empty.vlt");
        Vault::encode(&file, b"pw", &container, false).unwrap();
        assert_eq!(fs::metadata(&container).unwrap().len(), (BLOCK_LEN * 2) as u64);

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("empty.txt")).unwrap(), b"");
    }

    #[test]
    fn round_trips_directory_tree() {
        let src = tempdir().unwrap();
        let sub = src.path().join("d");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("a.txt"), b"A").unwrap();
        fs::write(sub.join("b.txt"), b"BB").unwrap();

        let container = src.path().join("d.vlt");
        Vault::encode(&sub, b"pw", &container, false).unwrap();

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("d/a.txt")).unwrap(), b"A");
        assert_eq!(fs::read(out.path().join("d/b.txt")).unwrap(), b"BB");
    }

    #[test]
    fn round_trips_300kib_repeating_pattern() {
        let src = tempdir().unwrap();
        let file = src.path().join("big.txt");
        let data: Vec<u8> = b"AB".iter().cycle().take(300 * 1024).copied().collect();
        fs::write(&file, &data).unwrap();

        let container = src.path().join("big.vlt");
        Vault::encode(&file, b"pw", &container, false).unwrap();

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("big.txt")).unwrap(), data);
    }

    #[test]
    fn round_trips_exact_block_sized_file() {
        let src = tempdir().unwrap();
        let file = src.path().join("exact.bin");
        let data = vec![9u8; BLOCK_LEN];
        fs::write(&file, &data).unwrap();

        let container = src.path().join("exact.vlt");
        Vault::encode(&file, b"pw", &container, false).unwrap();

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("exact.bin")).unwrap(), data);
    }

    #[test]
    fn round_trips_with_one_byte_password() {
        let src = tempdir().unwrap();
        let file = src.path().join("hello.txt");
        fs::write(&file, b"hello\n").unwrap();

        let container = src.path().join("hello.vlt");
        Vault::encode(&file, b"p", &container, false).unwrap();

        let out = tempdir().unwrap();
        Vault::decode(&container, b"p", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("hello.txt")).unwrap(), b"hello\n");
    }

    #[test]
    fn rejects_empty_password() {
        let src = tempdir().unwrap();
        let file = src.path().join("a.txt");
        fs::write(&file, b"A").unwrap();
        let container = src.path().join("a.vlt");
        let err = Vault::encode(&file, b"", &container, false);
        assert!(err.is_err());
    }

    #[test]
    fn delete_after_read_removes_source_once_encoded() {
        let src = tempdir().unwrap();
        let file = src.path().join("throwaway.txt");
        fs::write(&file, b"delete me once archived").unwrap();

        let container = src.path().join("throwaway.vlt");
        Vault::encode(&file, b"pw", &container, true).unwrap();
        assert!(!file.exists(), "source file should be removed after encoding with delete_after_read=true");

        let out = tempdir().unwrap();
        Vault::decode(&container, b"pw", out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("throwaway.txt")).unwrap(), b"delete me once archived");
    }

    #[test]
    fn delete_after_read_false_keeps_source() {
        let src = tempdir().unwrap();
        let file = src.path().join("keepme.txt");
        fs::write(&file, b"still here").unwrap();

        let container = src.path().join("keepme.vlt");
        Vault::encode(&file, b"pw", &container, false).unwrap();
        assert!(file.exists(), "source file should survive when delete_after_read=false");
    }
}
