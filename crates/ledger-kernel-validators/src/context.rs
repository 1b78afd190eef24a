//! What stateful validators may observe.

use ledger_kernel_cache::ReadOnlyCache;
use ledger_kernel_core::{convert_to_importance_height, Height};

/// Height, importance grouping and a read-only cache handle.
///
/// The cache handle only offers lookups; validators cannot mutate state.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorContext<'a> {
    height: Height,
    importance_grouping: u64,
    cache: ReadOnlyCache<'a>,
}

impl<'a> ValidatorContext<'a> {
    pub fn new(height: Height, importance_grouping: u64, cache: ReadOnlyCache<'a>) -> Self {
        Self {
            height,
            importance_grouping,
            cache,
        }
    }

    /// Height of the block being validated.
    pub fn height(&self) -> Height {
        self.height
    }

    pub fn importance_grouping(&self) -> u64 {
        self.importance_grouping
    }

    /// The importance height in effect at [`Self::height`].
    pub fn importance_height(&self) -> Height {
        convert_to_importance_height(self.height, self.importance_grouping)
    }

    pub fn cache(&self) -> ReadOnlyCache<'a> {
        self.cache
    }
}
