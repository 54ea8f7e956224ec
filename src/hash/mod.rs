//! Digest computation and verification for candidate strings.
//!
//! Plain digests (SHA-256/384/512) are the lowercase hex encoding of the
//! digest of the candidate's UTF-8 bytes. PBKDF2 digests are
//! PBKDF2-HMAC-SHA256 and carry their salt: the output is
//! `hex(salt) || hex(derived_key)`, so a PBKDF2 digest can be verified
//! without any side channel for the salt.

use crate::config::HashConfig;
use crate::error::{PipelineError, Result};
use rand::Rng;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Length in bytes of the PBKDF2 derived key (one SHA-256 block).
pub const PBKDF2_KEY_LENGTH: usize = 32;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
pub const DEFAULT_PBKDF2_SALT_LENGTH: usize = 32;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
    /// PBKDF2-HMAC-SHA256 with an embedded random salt
    Pbkdf2,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Pbkdf2,
    ];

    /// Fixed hex length of a digest, `None` for the salted PBKDF2 format.
    pub fn digest_hex_len(&self) -> Option<usize> {
        match self {
            Algorithm::Sha256 => Some(64),
            Algorithm::Sha384 => Some(96),
            Algorithm::Sha512 => Some(128),
            Algorithm::Pbkdf2 => None,
        }
    }

    /// Shortest hex string that can be a digest of this algorithm.
    pub fn min_digest_hex_len(&self, salt_length: usize) -> usize {
        self.digest_hex_len()
            .unwrap_or(salt_length * 2 + PBKDF2_KEY_LENGTH * 2)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Sha256 => write!(f, "SHA256"),
            Algorithm::Sha384 => write!(f, "SHA384"),
            Algorithm::Sha512 => write!(f, "SHA512"),
            Algorithm::Pbkdf2 => write!(f, "PBKDF2"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace(['-', '_'], "").as_str() {
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA384" => Ok(Algorithm::Sha384),
            "SHA512" => Ok(Algorithm::Sha512),
            "PBKDF2" => Ok(Algorithm::Pbkdf2),
            _ => Err(PipelineError::config(format!(
                "Unsupported algorithm: '{}'. Must be one of SHA256, SHA384, SHA512, PBKDF2",
                s
            ))),
        }
    }
}

impl serde::Serialize for Algorithm {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Algorithm {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Hash computation engine for one algorithm and parameter set.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: Algorithm,
    iterations: u32,
    salt_length: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(
            Algorithm::default(),
            DEFAULT_PBKDF2_ITERATIONS,
            DEFAULT_PBKDF2_SALT_LENGTH,
        )
    }
}

impl Hasher {
    /// `iterations` and `salt_length` only affect PBKDF2; both are clamped to at least 1.
    pub fn new(algorithm: Algorithm, iterations: u32, salt_length: usize) -> Self {
        Self {
            algorithm,
            iterations: iterations.max(1),
            salt_length: salt_length.max(1),
        }
    }

    /// Build a hasher from an algorithm name, failing fast on unsupported names.
    pub fn from_name(name: &str, iterations: u32, salt_length: usize) -> Result<Self> {
        Ok(Self::new(name.parse()?, iterations, salt_length))
    }

    pub fn from_config(config: &HashConfig) -> Self {
        Self::new(
            config.algorithm,
            config.pbkdf2_iterations,
            config.pbkdf2_salt_length,
        )
    }

    /// One-shot digest with default parameters.
    pub fn quick_hash(data: &str, algorithm: Algorithm) -> String {
        Hasher::new(
            algorithm,
            DEFAULT_PBKDF2_ITERATIONS,
            DEFAULT_PBKDF2_SALT_LENGTH,
        )
        .hash(data, None)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt_length(&self) -> usize {
        self.salt_length
    }

    /// Compute the lowercase hex digest of `data`.
    ///
    /// For PBKDF2 a random salt of `salt_length` bytes is drawn when `salt`
    /// is `None`; other algorithms ignore `salt`.
    pub fn hash(&self, data: &str, salt: Option<&[u8]>) -> String {
        let bytes = data.as_bytes();
        match self.algorithm {
            Algorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            Algorithm::Sha384 => hex::encode(Sha384::digest(bytes)),
            Algorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
            Algorithm::Pbkdf2 => match salt {
                Some(salt) => self.pbkdf2_hex(data, salt),
                None => {
                    let mut salt = vec![0u8; self.salt_length];
                    rand::rng().fill(salt.as_mut_slice());
                    self.pbkdf2_hex(data, &salt)
                }
            },
        }
    }

    /// Check whether `data` hashes to `hash_value` (case-insensitive).
    ///
    /// Never fails: malformed PBKDF2 digests (too short, non-hex salt)
    /// simply do not verify.
    pub fn verify(&self, data: &str, hash_value: &str) -> bool {
        match self.algorithm {
            Algorithm::Pbkdf2 => self.verify_pbkdf2(data, hash_value),
            _ => self.hash(data, None).eq_ignore_ascii_case(hash_value),
        }
    }

    /// Test a candidate against the target digest.
    #[inline]
    pub fn matches(&self, candidate: &str, target: &str) -> bool {
        self.verify(candidate, target)
    }

    fn pbkdf2_hex(&self, data: &str, salt: &[u8]) -> String {
        let mut key = [0u8; PBKDF2_KEY_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha256>(data.as_bytes(), salt, self.iterations, &mut key);

        let mut out = hex::encode(salt);
        out.push_str(&hex::encode(key));
        out
    }

    fn verify_pbkdf2(&self, data: &str, hash_value: &str) -> bool {
        let expected = hash_value.to_ascii_lowercase();
        let salt_hex_len = self.salt_length * 2;
        if expected.len() < self.algorithm.min_digest_hex_len(self.salt_length) {
            return false;
        }

        let Some(salt_hex) = expected.get(..salt_hex_len) else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };

        self.pbkdf2_hex(data, &salt) == expected
    }
}
