//! The composed ledger cache: views, deltas and commit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use ledger_kernel_core::{ArtifactDefinition, ArtifactId, Height, PublicKey};

use crate::error::{CacheError, Result};
use crate::state::{AccountState, DifficultyInfo};
use crate::sub_cache::{SubCacheDelta, SubCacheRead, SubCacheView};

pub type AccountView = SubCacheView<PublicKey, AccountState>;
pub type ArtifactView = SubCacheView<ArtifactId, ArtifactDefinition>;
pub type DifficultyView = SubCacheView<Height, DifficultyInfo>;

pub type AccountDelta = SubCacheDelta<PublicKey, AccountState>;
pub type ArtifactDelta = SubCacheDelta<ArtifactId, ArtifactDefinition>;
pub type DifficultyDelta = SubCacheDelta<Height, DifficultyInfo>;

static NEXT_DELTA_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default)]
struct CacheState {
    version: Height,
    accounts: AccountView,
    artifacts: ArtifactView,
    difficulties: DifficultyView,
}

/// The ledger cache: accounts, artifacts and difficulty samples.
///
/// Views are immutable snapshots; a commit swaps in a new state atomically, so
/// a view never observes later commits.
#[derive(Debug, Default)]
pub struct LedgerCache {
    state: RwLock<Arc<CacheState>>,
}

impl LedgerCache {
    /// Create an empty cache at version zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache whose next commit is `version + 1`.
    pub fn at_version(version: Height) -> Self {
        Self {
            state: RwLock::new(Arc::new(CacheState {
                version,
                ..CacheState::default()
            })),
        }
    }

    /// Version of the last commit.
    pub fn version(&self) -> Height {
        self.state.read().version
    }

    /// Snapshot the committed state.
    pub fn create_view(&self) -> CacheView {
        CacheView {
            state: Arc::clone(&*self.state.read()),
        }
    }

    /// Start a mutable working copy over the committed state.
    pub fn create_delta(&self) -> CacheDelta {
        let base = Arc::clone(&*self.state.read());
        CacheDelta {
            id: NEXT_DELTA_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            parent: None,
            accounts: SubCacheDelta::new(base.accounts.clone()),
            artifacts: SubCacheDelta::new(base.artifacts.clone()),
            difficulties: SubCacheDelta::new(base.difficulties.clone()),
            base,
        }
    }

    /// Publish `delta` as the state at `version`.
    ///
    /// `version` must follow the current version, and `delta` must have been
    /// created from the current state.
    pub fn commit(&self, delta: CacheDelta, version: Height) -> Result<CommitSummary> {
        if delta.parent.is_some() {
            return Err(CacheError::NestedCommit);
        }

        let mut state = self.state.write();
        if !Arc::ptr_eq(&*state, &delta.base) {
            tracing::warn!(
                base = %delta.base.version,
                current = %state.version,
                "rejecting stale cache delta"
            );
            return Err(CacheError::StaleDelta {
                base: delta.base.version,
            });
        }
        let expected = state
            .version
            .checked_next()
            .ok_or(CacheError::VersionExhausted(state.version))?;
        if version != expected {
            return Err(CacheError::OutOfOrder {
                expected,
                actual: version,
            });
        }

        let mut summary = CommitSummary {
            version,
            difficulties_added: delta.difficulties.added().map(|(_, info)| *info).collect(),
            difficulties_removed: delta.difficulties.removed().copied().collect(),
        };
        summary.difficulties_added.sort_by_key(|info| info.height);
        summary.difficulties_removed.sort();

        *state = Arc::new(CacheState {
            version,
            accounts: delta.accounts.into_view(),
            artifacts: delta.artifacts.into_view(),
            difficulties: delta.difficulties.into_view(),
        });

        tracing::debug!(version = %version, "committed cache state");
        Ok(summary)
    }
}

/// What a commit changed in the difficulty sub-cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub version: Height,
    /// Samples added or replaced, in height order.
    pub difficulties_added: Vec<DifficultyInfo>,
    /// Heights removed, ascending.
    pub difficulties_removed: Vec<Height>,
}

/// Immutable snapshot of the cache.
#[derive(Debug, Clone)]
pub struct CacheView {
    state: Arc<CacheState>,
}

impl CacheView {
    pub fn version(&self) -> Height {
        self.state.version
    }

    pub fn accounts(&self) -> &AccountView {
        &self.state.accounts
    }

    pub fn artifacts(&self) -> &ArtifactView {
        &self.state.artifacts
    }

    pub fn difficulties(&self) -> &DifficultyView {
        &self.state.difficulties
    }

    /// Narrow read-only handle for validators.
    pub fn to_read_only(&self) -> ReadOnlyCache<'_> {
        ReadOnlyCache {
            version: self.state.version,
            accounts: &self.state.accounts,
            artifacts: &self.state.artifacts,
            difficulties: &self.state.difficulties,
        }
    }
}

/// Mutable working copy of the cache.
///
/// Single-writer. Dropping a delta discards its changes.
#[derive(Debug)]
pub struct CacheDelta {
    id: u64,
    generation: u64,
    parent: Option<(u64, u64)>,
    base: Arc<CacheState>,
    accounts: AccountDelta,
    artifacts: ArtifactDelta,
    difficulties: DifficultyDelta,
}

impl CacheDelta {
    /// Version of the state this delta is layered over.
    pub fn base_version(&self) -> Height {
        self.base.version
    }

    pub fn accounts(&self) -> &AccountDelta {
        &self.accounts
    }

    pub fn artifacts(&self) -> &ArtifactDelta {
        &self.artifacts
    }

    pub fn difficulties(&self) -> &DifficultyDelta {
        &self.difficulties
    }

    pub fn accounts_mut(&mut self) -> &mut AccountDelta {
        self.generation += 1;
        &mut self.accounts
    }

    pub fn artifacts_mut(&mut self) -> &mut ArtifactDelta {
        self.generation += 1;
        &mut self.artifacts
    }

    pub fn difficulties_mut(&mut self) -> &mut DifficultyDelta {
        self.generation += 1;
        &mut self.difficulties
    }

    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }

    /// Start a speculative delta on top of this one.
    ///
    /// Keep it with [`CacheDelta::absorb`] or drop it to discard.
    pub fn nested(&self) -> CacheDelta {
        CacheDelta {
            id: NEXT_DELTA_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            parent: Some((self.id, self.generation)),
            base: Arc::clone(&self.base),
            accounts: self.accounts.nested(),
            artifacts: self.artifacts.nested(),
            difficulties: self.difficulties.nested(),
        }
    }

    /// Fold a nested delta created from this delta back in.
    ///
    /// Fails if `nested` was not created from this delta, or if this delta was
    /// mutated after nesting.
    pub fn absorb(&mut self, nested: CacheDelta) -> Result<()> {
        if nested.parent != Some((self.id, self.generation)) {
            return Err(CacheError::DetachedDelta);
        }
        self.accounts.absorb(nested.accounts);
        self.artifacts.absorb(nested.artifacts);
        self.difficulties.absorb(nested.difficulties);
        self.generation += 1;
        Ok(())
    }

    /// Narrow read-only handle for validators.
    pub fn to_read_only(&self) -> ReadOnlyCache<'_> {
        ReadOnlyCache {
            version: self.base.version,
            accounts: &self.accounts,
            artifacts: &self.artifacts,
            difficulties: &self.difficulties,
        }
    }
}

/// The read contract validators see: `get` and `contains` per sub-cache.
#[derive(Clone, Copy)]
pub struct ReadOnlyCache<'a> {
    version: Height,
    accounts: &'a dyn SubCacheRead<PublicKey, AccountState>,
    artifacts: &'a dyn SubCacheRead<ArtifactId, ArtifactDefinition>,
    difficulties: &'a dyn SubCacheRead<Height, DifficultyInfo>,
}

impl<'a> ReadOnlyCache<'a> {
    /// Version of the committed state underneath.
    pub fn version(&self) -> Height {
        self.version
    }

    pub fn accounts(&self) -> ReadOnlySubCache<'a, PublicKey, AccountState> {
        ReadOnlySubCache {
            inner: self.accounts,
        }
    }

    pub fn artifacts(&self) -> ReadOnlySubCache<'a, ArtifactId, ArtifactDefinition> {
        ReadOnlySubCache {
            inner: self.artifacts,
        }
    }

    pub fn difficulties(&self) -> ReadOnlySubCache<'a, Height, DifficultyInfo> {
        ReadOnlySubCache {
            inner: self.difficulties,
        }
    }
}

impl std::fmt::Debug for ReadOnlyCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOnlyCache")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Read-only handle to one sub-cache.
pub struct ReadOnlySubCache<'a, K, V> {
    inner: &'a dyn SubCacheRead<K, V>,
}

impl<'a, K, V> Clone for ReadOnlySubCache<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for ReadOnlySubCache<'a, K, V> {}

impl<'a, K, V> ReadOnlySubCache<'a, K, V> {
    pub fn get(&self, key: &K) -> Option<&'a V> {
        self.inner.find(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }
}
