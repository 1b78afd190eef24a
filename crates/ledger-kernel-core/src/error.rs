//! Error types for the Ledger Kernel Core.

use thiserror::Error;

use crate::types::EntityType;

/// Core errors outside of entity parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration decoding error: {0}")]
    ConfigDecoding(#[from] serde_json::Error),
}

/// Malformed-input errors raised while reading an entity buffer.
///
/// Any of these makes the entity unprocessable; no part of it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("truncated entity: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("declared size {declared} does not match buffer length {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("embedded transaction at offset {offset} declares invalid size {size}")]
    InvalidEmbeddedSize { offset: usize, size: u32 },

    #[error("embedded transactions occupy {actual} bytes but payload size is {declared}")]
    PayloadSizeMismatch { declared: u32, actual: usize },

    #[error("cosignature region of {0} bytes is not a whole number of cosignatures")]
    PartialCosignature(usize),

    #[error("real size of entity could not be determined")]
    IndeterminateSize,

    #[error("unexpected entity type {actual}, expected {expected}")]
    UnexpectedType {
        expected: EntityType,
        actual: EntityType,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
