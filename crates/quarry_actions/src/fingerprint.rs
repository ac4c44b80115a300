//! Digest sink for action-cache keys.
//!
//! The byte layout written here keys persisted action caches, so it is part
//! of the on-disk compatibility surface: strings are length-prefixed to keep
//! adjacent additions unambiguous, and feature salts are 16-byte UUIDs.

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    pub fn add_str(&mut self, s: &str) -> &mut Self {
        self.add_u64(s.len() as u64);
        self.hasher.update(s.as_bytes());
        self
    }

    pub fn add_u64(&mut self, v: u64) -> &mut Self {
        self.hasher.update(v.to_be_bytes());
        self
    }

    pub fn add_uuid(&mut self, id: Uuid) -> &mut Self {
        self.hasher.update(id.as_bytes());
        self
    }

    /// Consumes the sink and returns the lowercase hex digest.
    pub fn hex_digest(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Fingerprint::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_keeps_boundaries() {
        let mut a = Fingerprint::new();
        a.add_str("ab").add_str("c");
        let mut b = Fingerprint::new();
        b.add_str("a").add_str("bc");
        assert_ne!(a.hex_digest(), b.hex_digest());
    }

    #[test]
    fn same_input_same_digest() {
        let mut a = Fingerprint::new();
        a.add_str("x").add_u64(7);
        let mut b = Fingerprint::new();
        b.add_str("x").add_u64(7);
        assert_eq!(a.hex_digest(), b.hex_digest());
    }
}
