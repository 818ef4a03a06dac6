//! SHA-256 checksum of migration content, used for drift detection.

use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-width digest of a migration's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Compute the checksum of a string
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Raw digest bytes, as persisted in the version-history table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex rendering for reports.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether a stored digest is byte-for-byte equal to this one.
    pub fn matches(&self, stored: &[u8]) -> bool {
        self.0.as_slice() == stored
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
