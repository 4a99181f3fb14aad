//! Content fingerprint type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest of a file's full byte content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// First 12 hex characters, enough to tell groups apart in logs.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash_is_prefix() {
        let hash = ContentHash::new([0x1f; 32]);
        assert_eq!(hash.short(), "1f1f1f1f1f1f");
        assert!(hash.to_hex().starts_with(&hash.short()));
    }

    #[test]
    fn test_display_matches_hex() {
        let hash = ContentHash::new([0x0a; 32]);
        assert_eq!(hash.to_string(), hash.to_hex());
    }
}
