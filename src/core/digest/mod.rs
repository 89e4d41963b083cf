//! # Digest Module
//!
//! Content digests used as the exact-duplicate identity.
//!
//! Files are streamed through BLAKE3 in fixed-size blocks, so memory use does
//! not depend on file size. Two files with equal digests are treated as the
//! same content no matter their names or locations.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

/// Block size used when streaming files through the hasher
pub const BLOCK_SIZE: usize = 64 * 1024;

/// 256-bit content digest, serialized as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// Digest of an in-memory buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        blake3::Hash::from_hex(s.trim())
            .map(|h| Self(*h.as_bytes()))
            .map_err(|e| format!("invalid digest {s:?}: {e}"))
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

/// Streams files into content digests
#[derive(Debug, Clone)]
pub struct ContentHasher {
    block_size: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
        }
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with a custom block size (minimum 1 byte)
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Compute the digest of a file
    pub fn hash(&self, path: &Path) -> Result<ContentDigest, ItemError> {
        let failure = |source| ItemError::HashFailure {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(failure)?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            let bytes_read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(failure(e)),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(ContentDigest(*hasher.finalize().as_bytes()))
    }
}
