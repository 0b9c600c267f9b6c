//! Content hashing and integrity verification.
//!
//! Gateway uptime fixtures carry the expected hash of a reference document in
//! Subresource-Integrity form (`<algorithm>-<base64 digest>`). This module
//! parses those strings once and checks fetched bytes against them.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256, Sha384, Sha512};
use thiserror::Error;

/// Errors produced while parsing an integrity string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Integrity string must look like '<algorithm>-<digest>'")]
    MissingSeparator,

    #[error("Unsupported integrity algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Integrity digest is not valid base64")]
    InvalidEncoding,

    #[error("Integrity digest has {actual} bytes, {algorithm} needs {expected}")]
    WrongLength {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Hash algorithms accepted in integrity strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl IntegrityAlgorithm {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn digest_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hashes `content` with this algorithm.
    pub fn digest(&self, content: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(content).to_vec(),
            Self::Sha384 => Sha384::digest(content).to_vec(),
            Self::Sha512 => Sha512::digest(content).to_vec(),
        }
    }
}

/// A parsed integrity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityHash {
    algorithm: IntegrityAlgorithm,
    digest: Vec<u8>,
}

impl IntegrityHash {
    /// Parses `sha256-…`, `sha384-…` or `sha512-…`.
    pub fn parse(value: &str) -> Result<Self, IntegrityError> {
        let (prefix, encoded) = value
            .trim()
            .split_once('-')
            .ok_or(IntegrityError::MissingSeparator)?;

        let algorithm = IntegrityAlgorithm::from_prefix(prefix)
            .ok_or_else(|| IntegrityError::UnsupportedAlgorithm(prefix.to_string()))?;

        let digest = STANDARD
            .decode(encoded)
            .map_err(|_| IntegrityError::InvalidEncoding)?;

        if digest.len() != algorithm.digest_len() {
            return Err(IntegrityError::WrongLength {
                algorithm: algorithm.name(),
                expected: algorithm.digest_len(),
                actual: digest.len(),
            });
        }

        Ok(Self { algorithm, digest })
    }

    /// Builds the integrity hash of `content` with the given algorithm.
    pub fn of(algorithm: IntegrityAlgorithm, content: &[u8]) -> Self {
        Self {
            algorithm,
            digest: algorithm.digest(content),
        }
    }

    pub fn algorithm(&self) -> IntegrityAlgorithm {
        self.algorithm
    }

    /// Returns true when `content` hashes to the expected digest.
    pub fn matches(&self, content: &[u8]) -> bool {
        self.algorithm.digest(content) == self.digest
    }
}

impl std::fmt::Display for IntegrityHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.algorithm.name(), STANDARD.encode(&self.digest))
    }
}
