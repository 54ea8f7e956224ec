//! Target digest validation

use crate::hash::Algorithm;

/// Trim surrounding whitespace and lowercase a digest.
pub fn normalize_hash(hash_value: &str) -> String {
    hash_value.trim().to_ascii_lowercase()
}

/// True if `value` is non-empty and made only of hex digits.
pub fn is_hex(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check that `hash_value` is a well-formed digest for `algorithm`.
///
/// Plain digests must have the exact hex length of the algorithm. PBKDF2
/// digests carry a salt of `salt_length` bytes in front of the 32-byte key,
/// so they must be at least that long and have an even length.
pub fn is_valid_hash(hash_value: &str, algorithm: Algorithm, salt_length: usize) -> bool {
    let hash_value = normalize_hash(hash_value);
    if !is_hex(&hash_value) {
        return false;
    }

    match algorithm.digest_hex_len() {
        Some(len) => hash_value.len() == len,
        None => {
            hash_value.len() >= algorithm.min_digest_hex_len(salt_length)
                && hash_value.len() % 2 == 0
        }
    }
}
