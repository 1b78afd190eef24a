//! Error types for the cache module.

use ledger_kernel_core::{Amount, AssetId, Height};
use thiserror::Error;

/// Errors that can occur during cache and projection operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Commit version is not the successor of the current version.
    #[error("out of order commit: expected version {expected}, got {actual}")]
    OutOfOrder { expected: Height, actual: Height },

    /// The current version is `u64::MAX` and has no successor.
    #[error("version {0} has no successor")]
    VersionExhausted(Height),

    /// The delta's base is no longer the committed state.
    #[error("stale delta: base version {base} was superseded")]
    StaleDelta { base: Height },

    /// A nested delta's parent changed after nesting, or it belongs to another delta.
    #[error("nested delta does not match its parent")]
    DetachedDelta,

    /// Nested deltas are absorbed into their parent, never committed.
    #[error("nested delta cannot be committed directly")]
    NestedCommit,

    /// Debit larger than the available balance.
    #[error("insufficient balance of asset {asset_id}: {available} available, {requested} requested")]
    InsufficientBalance {
        asset_id: AssetId,
        available: Amount,
        requested: Amount,
    },

    /// Credit would overflow.
    #[error("balance overflow for asset {0}")]
    BalanceOverflow(AssetId),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A blocking storage task failed to complete.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
