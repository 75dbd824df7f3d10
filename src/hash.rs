//! Deterministic 64-bit content hashing (FNV-1a), `spec.md` §3/§4.2.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::CoreError;

/// A 64-bit FNV-1a content hash.
pub type ContentHash = u64;

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Hashes the raw bytes of `path` with FNV-1a, using the constants fixed by
/// `spec.md` §3. Reads the whole file in binary mode; never interprets its
/// contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, CoreError> {
    let file = File::open(path).map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
    let mut reader = BufReader::new(file);
    let mut buf = [0u8; 8192];
    let mut hash = FNV_OFFSET_BASIS;

    loop {
        let n = reader.read(&mut buf).map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }

    Ok(hash)
}

/// Hashes an in-memory byte slice with the same algorithm; used by tests and
/// by components that already have file contents in memory.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_the_offset_basis() {
        assert_eq!(hash_bytes(&[]), FNV_OFFSET_BASIS);
    }

    #[test]
    fn single_zero_byte() {
        let expected = (FNV_OFFSET_BASIS ^ 0u64).wrapping_mul(FNV_PRIME);
        assert_eq!(hash_bytes(&[0u8]), expected);
    }

    #[test]
    fn is_deterministic_and_order_sensitive() {
        assert_eq!(hash_bytes(b"hello"), hash_bytes(b"hello"));
        assert_ne!(hash_bytes(b"hello"), hash_bytes(b"olleh"));
    }

    #[test]
    fn single_byte_change_changes_hash() {
        assert_ne!(hash_bytes(b"aaaa"), hash_bytes(b"aaab"));
    }

    #[test]
    fn hash_file_matches_hash_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"content").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"content"));
    }

    #[test]
    fn hash_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(matches!(hash_file(&path), Err(CoreError::Io { .. })));
    }
}
