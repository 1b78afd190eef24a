//! Difficulty-history projection.
//!
//! Secondary stores mirror the last `history_size` difficulty samples. After each
//! commit the cache yields a [`DifficultyFeed`]: the samples to append and the
//! height below which samples are pruned.

use async_trait::async_trait;

use ledger_kernel_core::Height;

use crate::cache::CommitSummary;
use crate::error::Result;
use crate::state::DifficultyInfo;

pub mod memory;
pub mod migration;
pub mod sqlite;

pub use memory::MemoryDifficultyStorage;
pub use sqlite::SqliteDifficultyStorage;

/// Append/prune instructions for one committed height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyFeed {
    pub height: Height,
    /// Samples to insert or replace, in height order.
    pub appended: Vec<DifficultyInfo>,
    /// Samples below this height fall outside the window.
    pub prune_before: Height,
}

impl DifficultyFeed {
    /// Build the feed for a commit, keeping the last `history_size` heights up to
    /// and including the committed one.
    pub fn from_commit(summary: &CommitSummary, history_size: u64) -> Self {
        let prune_before = (summary.version.0 + 1).saturating_sub(history_size);
        Self {
            height: summary.version,
            appended: summary
                .difficulties_added
                .iter()
                .filter(|info| info.height.0 >= prune_before)
                .copied()
                .collect(),
            prune_before: Height(prune_before),
        }
    }
}

/// A secondary store mirroring recent difficulty samples.
#[async_trait]
pub trait DifficultyHistoryStorage: Send + Sync {
    /// Number of samples the store retains.
    fn history_size(&self) -> u64;

    /// Apply one feed.
    async fn apply(&self, feed: &DifficultyFeed) -> Result<()>;

    /// All retained samples in height order.
    async fn load(&self) -> Result<Vec<DifficultyInfo>>;

    /// Height of the newest retained sample.
    async fn latest_height(&self) -> Result<Option<Height>>;
}
