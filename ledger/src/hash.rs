//! # Hashing Utilities
//!
//! SHA-256 is the only digest the ledger uses. Block hashes are handled as
//! lowercase hex strings everywhere: they are stored that way in
//! `prev_hash`, compared that way during validation, and the proof-of-work
//! target is phrased in hex digits.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data` as a 64-character lowercase hex string.
///
/// # Example
///
/// ```
/// use hashchain::hash::sha256_hex;
///
/// let digest = sha256_hex(b"");
/// assert_eq!(digest, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    sha256_hex_multi(&[data])
}

/// Hash several byte slices as if they were concatenated.
///
/// Parts are fed to the hasher one after another, so no intermediate
/// buffer is allocated.
pub fn sha256_hex_multi(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Number of consecutive `'0'` characters at the start of a hex digest.
pub fn leading_zero_digits(hex_digest: &str) -> usize {
    hex_digest.bytes().take_while(|&b| b == b'0').count()
}

/// Whether `hex_digest` starts with at least `difficulty` zero digits.
///
/// A difficulty of zero is met by every digest.
pub fn meets_difficulty(hex_digest: &str, difficulty: usize) -> bool {
    leading_zero_digits(hex_digest) >= difficulty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn multi_matches_concatenation() {
        let multi = sha256_hex_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(multi, sha256_hex(b"hello world"));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = sha256_hex(b"ledger");
        assert_eq!(digest.len(), crate::config::HASH_HEX_LENGTH);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn leading_zero_counting() {
        assert_eq!(leading_zero_digits("abc"), 0);
        assert_eq!(leading_zero_digits("00a0"), 2);
        assert_eq!(leading_zero_digits("0000"), 4);
        assert_eq!(leading_zero_digits(""), 0);
    }

    #[test]
    fn difficulty_threshold() {
        assert!(meets_difficulty("00ff", 0));
        assert!(meets_difficulty("00ff", 2));
        assert!(!meets_difficulty("00ff", 3));
        assert!(meets_difficulty("ffff", 0));
    }
}
