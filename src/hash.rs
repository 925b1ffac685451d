// src/hash.rs

//! Hashing for configuration fingerprints and archive checksums
//!
//! Two algorithms are in play:
//! - **SHA-256**: fingerprints of build configurations (shared build keys)
//! - **MD5**: the `md5` option carried by recipes to verify source archives
//!
//! MD5 is only used to match checksums published alongside upstream
//! tarballs; it is never used to key anything we create.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// SHA-256 (256-bit cryptographic hash)
    #[default]
    Sha256,
    /// MD5 (128-bit, legacy upstream checksums only)
    Md5,
}

impl HashAlgorithm {
    /// Get the hash output length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Md5 => 32,
        }
    }

    /// Get the algorithm name as a string
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Md5 => "md5",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            _ => Err(format!("unknown hash algorithm: {}", s)),
        }
    }
}

/// Streaming hasher over either algorithm
pub enum Hasher {
    Sha256(Sha256),
    Md5(Md5),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Md5(h) => h.update(data),
        }
    }

    /// Finish and return the lowercase hex digest
    pub fn finalize_hex(self) -> String {
        match self {
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Md5(h) => hex::encode(h.finalize()),
        }
    }
}

/// Hash a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize_hex()
}

/// Hash a file's contents without loading it all into memory
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize_hex())
}

/// Parse a checksum option into algorithm and expected digest
///
/// Accepts `algorithm:digest` or a bare digest, whose algorithm is inferred
/// from its length (32 hex chars = MD5, 64 = SHA-256).
pub fn parse_checksum(checksum: &str) -> Option<(HashAlgorithm, String)> {
    let checksum = checksum.trim();
    if checksum.is_empty() {
        return None;
    }

    if let Some((algo, digest)) = checksum.split_once(':') {
        let algorithm = algo.parse().ok()?;
        return Some((algorithm, digest.trim().to_lowercase()));
    }

    match checksum.len() {
        32 => Some((HashAlgorithm::Md5, checksum.to_lowercase())),
        64 => Some((HashAlgorithm::Sha256, checksum.to_lowercase())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Md5, b"hello"),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            hash_bytes(HashAlgorithm::Sha256, b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hash_file_matches_bytes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("f");
        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(
            hash_file(HashAlgorithm::Md5, &path).unwrap(),
            hash_bytes(HashAlgorithm::Md5, b"hello")
        );
    }

    #[test]
    fn test_parse_checksum() {
        let (algo, digest) = parse_checksum("5D41402ABC4B2A76B9719D911017C592").unwrap();
        assert_eq!(algo, HashAlgorithm::Md5);
        assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");

        let (algo, _) = parse_checksum("sha256:abc").unwrap();
        assert_eq!(algo, HashAlgorithm::Sha256);

        assert!(parse_checksum("").is_none());
        assert!(parse_checksum("nope").is_none());
        assert!(parse_checksum("crc:1234").is_none());
    }

    #[test]
    fn test_hex_len() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Sha256, b"").len(),
            HashAlgorithm::Sha256.hex_len()
        );
        assert_eq!(
            hash_bytes(HashAlgorithm::Md5, b"").len(),
            HashAlgorithm::Md5.hex_len()
        );
    }
}
