//! Content fingerprints used as durable embedding-cache keys.
//!
//! A fingerprint is the first [`FINGERPRINT_LEN`] hex characters of the BLAKE3
//! digest of the text. Same text, same key; changed text is simply a new key,
//! so the cache never needs explicit invalidation.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const FINGERPRINT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn fingerprint(text: &str) -> Fingerprint {
    let hex = blake3::hash(text.as_bytes()).to_hex();
    Fingerprint(hex[..FINGERPRINT_LEN].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_fingerprint() {
        let a = fingerprint("quarterly budget report");
        let b = fingerprint("quarterly budget report");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_short_lowercase_hex() {
        let f = fingerprint("lunch plans");
        assert_eq!(f.as_str().len(), FINGERPRINT_LEN);
        assert!(f.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fingerprint_matches_blake3_prefix() {
        // Stable across runs: the key is derived from the digest alone.
        let expected = blake3::hash(b"budget overrun alert").to_hex().to_string();
        assert_eq!(fingerprint("budget overrun alert").as_str(), &expected[..FINGERPRINT_LEN]);
    }

    #[test]
    fn different_text_different_fingerprint() {
        assert_ne!(fingerprint("budget"), fingerprint("budget "));
        assert_ne!(fingerprint(""), fingerprint("a"));
    }
}
