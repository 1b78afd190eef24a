//! # Ledger Kernel Cache
//!
//! Versioned ledger state for the Ledger Kernel.
//!
//! The cache holds three sub-caches (accounts, artifacts and difficulty samples)
//! behind a single committed version. Readers take immutable views; writers
//! build a delta, optionally nest speculative deltas inside it, and commit it
//! as the next version.
//!
//! ## Key Types
//!
//! - [`LedgerCache`] - Committed state and the commit operation
//! - [`CacheView`] / [`CacheDelta`] - Snapshots and working copies
//! - [`ReadOnlyCache`] - The narrow read contract handed to validators
//! - [`DifficultyHistoryStorage`] - Secondary stores fed after each commit
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_kernel_cache::{AccountState, LedgerCache};
//! use ledger_kernel_core::{Height, PublicKey};
//!
//! let cache = LedgerCache::new();
//! let mut delta = cache.create_delta();
//! let key = PublicKey([1; 32]);
//! delta.accounts_mut().insert(key, AccountState::new(key, Height(1)));
//! cache.commit(delta, Height(1)).unwrap();
//!
//! assert!(cache.create_view().to_read_only().accounts().contains(&key));
//! ```

pub mod cache;
pub mod error;
pub mod projection;
pub mod state;
pub mod sub_cache;

pub use cache::{
    AccountDelta, AccountView, ArtifactDelta, ArtifactView, CacheDelta, CacheView, CommitSummary,
    DifficultyDelta, DifficultyView, LedgerCache, ReadOnlyCache, ReadOnlySubCache,
};
pub use error::{CacheError, Result};
pub use projection::{
    DifficultyFeed, DifficultyHistoryStorage, MemoryDifficultyStorage, SqliteDifficultyStorage,
};
pub use state::{AccountState, Balances, DifficultyInfo, ImportanceInfo};
pub use sub_cache::{SubCacheDelta, SubCacheRead, SubCacheView};
