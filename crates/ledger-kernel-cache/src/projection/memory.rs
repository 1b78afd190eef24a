//! In-memory difficulty history, mostly for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use ledger_kernel_core::Height;

use super::{DifficultyFeed, DifficultyHistoryStorage};
use crate::error::Result;
use crate::state::DifficultyInfo;

/// Difficulty history kept in a sorted map.
#[derive(Debug)]
pub struct MemoryDifficultyStorage {
    history_size: u64,
    samples: RwLock<BTreeMap<Height, DifficultyInfo>>,
}

impl MemoryDifficultyStorage {
    pub fn new(history_size: u64) -> Self {
        Self {
            history_size,
            samples: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl DifficultyHistoryStorage for MemoryDifficultyStorage {
    fn history_size(&self) -> u64 {
        self.history_size
    }

    async fn apply(&self, feed: &DifficultyFeed) -> Result<()> {
        let mut samples = self.samples.write();
        for info in &feed.appended {
            samples.insert(info.height, *info);
        }
        let retained = samples.split_off(&feed.prune_before);
        let pruned = samples.len();
        *samples = retained;

        if pruned > 0 {
            tracing::debug!(pruned, before = %feed.prune_before, "pruned difficulty samples");
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<DifficultyInfo>> {
        Ok(self.samples.read().values().copied().collect())
    }

    async fn latest_height(&self) -> Result<Option<Height>> {
        Ok(self.samples.read().keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel_core::{Difficulty, Timestamp};

    fn feed(height: u64, prune_before: u64) -> DifficultyFeed {
        DifficultyFeed {
            height: Height(height),
            appended: vec![DifficultyInfo {
                height: Height(height),
                timestamp: Timestamp(height * 15),
                difficulty: Difficulty(1000 + height),
            }],
            prune_before: Height(prune_before),
        }
    }

    #[tokio::test]
    async fn test_apply_and_prune() {
        let storage = MemoryDifficultyStorage::new(2);
        storage.apply(&feed(1, 0)).await.unwrap();
        storage.apply(&feed(2, 1)).await.unwrap();
        storage.apply(&feed(3, 2)).await.unwrap();

        let heights: Vec<_> = storage
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|info| info.height)
            .collect();
        assert_eq!(vec![Height(2), Height(3)], heights);
        assert_eq!(Some(Height(3)), storage.latest_height().await.unwrap());
    }
}
