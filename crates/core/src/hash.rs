//! Content fingerprints for exact deduplication

use sha2::{Digest, Sha256};

/// SHA-256 digest of a text
pub type Fingerprint = [u8; 32];

/// Compute the fingerprint of the given bytes
pub fn compute_fingerprint(data: &[u8]) -> Fingerprint {
    Sha256::digest(data).into()
}

/// Fingerprint of a text's UTF-8 bytes
pub fn fingerprint_text(text: &str) -> Fingerprint {
    compute_fingerprint(text.as_bytes())
}

/// Lowercase hex rendering, for logs
pub fn to_hex(fingerprint: &Fingerprint) -> String {
    hex::encode(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_consistency() {
        assert_eq!(fingerprint_text("hello"), fingerprint_text("hello"));
        assert_ne!(fingerprint_text("hello"), fingerprint_text("hello "));
        assert_ne!(fingerprint_text("Hello"), fingerprint_text("hello"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            to_hex(&fingerprint_text("")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            to_hex(&fingerprint_text("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
