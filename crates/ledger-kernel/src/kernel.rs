//! The Kernel: decomposition, validation and state in one place.
//!
//! The Kernel wires a transaction registry, a validator engine and the ledger
//! cache together. Transactions are validated against immutable views; blocks
//! are executed against a delta that is committed only when every
//! notification passes.

use std::sync::Arc;

use bytes::Bytes;
use rayon::prelude::*;

use ledger_kernel_cache::{
    CacheDelta, CacheError, CommitSummary, DifficultyFeed, DifficultyHistoryStorage, LedgerCache,
    ReadOnlyCache,
};
use ledger_kernel_core::{Block, ChainConfiguration, Height, Notification, Transaction};
use ledger_kernel_plugins::{default_registry, NotificationPublisher, PluginError, TransactionRegistry};
use ledger_kernel_validators::{
    standard_engine, Ed25519Verifier, FailureCode, SignatureVerifier, ValidatingSink,
    ValidationResult, ValidatorContext, ValidatorEngine,
};

use crate::error::Result;
use crate::observers::StateObserver;

/// Configuration for the Kernel.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Network parameters.
    pub chain: ChainConfiguration,
    /// Whether signature notifications are verified.
    pub verify_signatures: bool,
}

impl KernelConfig {
    pub fn new(chain: ChainConfiguration) -> Self {
        Self {
            chain,
            verify_signatures: true,
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new(ChainConfiguration::default())
    }
}

/// Result of validating an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// No rule failed, but at least one declined to accept.
    Neutral,
    /// A rule failed.
    Rejected(FailureCode),
    /// The entity could not be decomposed.
    Unprocessable(PluginError),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn failure(&self) -> Option<FailureCode> {
        match self {
            Self::Rejected(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<ValidationResult> for Verdict {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Success => Self::Accepted,
            ValidationResult::Neutral => Self::Neutral,
            ValidationResult::Failure(code) => Self::Rejected(code),
        }
    }
}

/// Result of processing a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block's changes were committed at its height.
    Committed(CommitSummary),
    /// The block was not accepted; nothing was committed.
    Rejected(Verdict),
}

impl BlockOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// The main Kernel struct.
pub struct Kernel {
    config: KernelConfig,
    publisher: NotificationPublisher,
    engine: Arc<ValidatorEngine>,
    observer: StateObserver,
    cache: Arc<LedgerCache>,
    projection: Option<Arc<dyn DifficultyHistoryStorage>>,
}

impl Kernel {
    /// Create a kernel with the standard plugins and rules over an empty cache.
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.chain.validate()?;
        let registry = default_registry()?;
        let verifier = config
            .verify_signatures
            .then(|| Arc::new(Ed25519Verifier) as Arc<dyn SignatureVerifier>);
        let engine = standard_engine(&config.chain, verifier);
        Ok(Self::with_parts(config, registry, engine))
    }

    /// Create a kernel from an assembled registry and engine.
    pub fn with_parts(
        config: KernelConfig,
        registry: Arc<TransactionRegistry>,
        engine: Arc<ValidatorEngine>,
    ) -> Self {
        Self {
            observer: StateObserver::new(config.chain.difficulty_history_size),
            publisher: NotificationPublisher::new(registry),
            engine,
            cache: Arc::new(LedgerCache::new()),
            projection: None,
            config,
        }
    }

    /// Use an existing cache.
    pub fn with_cache(mut self, cache: Arc<LedgerCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Feed difficulty samples to `storage` after every commit.
    pub fn with_projection(mut self, storage: Arc<dyn DifficultyHistoryStorage>) -> Self {
        self.projection = Some(storage);
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<LedgerCache> {
        &self.cache
    }

    pub fn registry(&self) -> &TransactionRegistry {
        self.publisher.registry()
    }

    pub fn engine(&self) -> &ValidatorEngine {
        &self.engine
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transaction Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate one transaction at `height` against the committed state.
    pub fn validate_transaction(&self, bytes: impl Into<Bytes>, height: Height) -> Verdict {
        let view = self.cache.create_view();
        self.validate_against(view.to_read_only(), bytes.into(), height)
    }

    /// Validate independent transactions in parallel.
    ///
    /// All transactions see the same view, taken before the batch starts.
    pub fn validate_transactions(&self, batch: &[Bytes], height: Height) -> Vec<Verdict> {
        let view = self.cache.create_view();
        let cache = view.to_read_only();
        batch
            .par_iter()
            .map(|bytes| self.validate_against(cache, bytes.clone(), height))
            .collect()
    }

    fn validate_against(&self, cache: ReadOnlyCache<'_>, bytes: Bytes, height: Height) -> Verdict {
        let transaction = match Transaction::from_bytes(bytes) {
            Ok(transaction) => transaction,
            Err(err) => return unprocessable(err.into()),
        };

        let context = ValidatorContext::new(height, self.config.chain.importance_grouping, cache);
        let mut sink = ValidatingSink::new(&self.engine, context);
        if let Err(err) = self.publisher.publish_transaction(&transaction, &mut sink) {
            return unprocessable(err);
        }

        let verdict = Verdict::from(sink.result());
        if let Verdict::Rejected(code) = verdict {
            tracing::debug!(
                entity_type = %transaction.entity_type(),
                %height,
                %code,
                "transaction rejected"
            );
        }
        verdict
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate a block as the next block without committing it.
    pub fn validate_block(&self, bytes: impl Into<Bytes>) -> Result<Verdict> {
        let block = match Block::from_bytes(bytes) {
            Ok(block) => block,
            Err(err) => return Ok(unprocessable(err.into())),
        };
        let mut delta = self.cache.create_delta();
        self.execute_block(&block, &mut delta)
    }

    /// Validate a block, apply it and commit it at its height.
    ///
    /// A block that is not accepted leaves the cache untouched. After a commit
    /// the difficulty feed is forwarded to the configured projection.
    pub async fn process_block(&self, bytes: impl Into<Bytes>) -> Result<BlockOutcome> {
        let block = match Block::from_bytes(bytes) {
            Ok(block) => block,
            Err(err) => return Ok(BlockOutcome::Rejected(unprocessable(err.into()))),
        };

        let mut delta = self.cache.create_delta();
        let verdict = self.execute_block(&block, &mut delta)?;
        if !verdict.is_accepted() {
            tracing::debug!(height = %block.height(), ?verdict, "block rejected");
            return Ok(BlockOutcome::Rejected(verdict));
        }

        let summary = self.cache.commit(delta, block.height())?;
        if let Some(storage) = &self.projection {
            let feed = DifficultyFeed::from_commit(&summary, storage.history_size());
            storage.apply(&feed).await?;
        }

        tracing::debug!(height = %block.height(), "block committed");
        Ok(BlockOutcome::Committed(summary))
    }

    /// Run the block's notifications through validators and observers.
    ///
    /// Each transaction runs in a nested delta that is absorbed only if the
    /// transaction passes.
    fn execute_block(&self, block: &Block, delta: &mut CacheDelta) -> Result<Verdict> {
        let height = block.height();
        let base = delta.base_version();
        let expected = base
            .checked_next()
            .ok_or(CacheError::VersionExhausted(base))?;
        if height != expected {
            return Err(CacheError::OutOfOrder {
                expected,
                actual: height,
            }
            .into());
        }

        let transactions = match block.transactions().collect::<std::result::Result<Vec<_>, _>>() {
            Ok(transactions) => transactions,
            Err(err) => return Ok(unprocessable(err.into())),
        };

        let mut header = Vec::new();
        self.publisher.publish_block_header(block, &mut header);

        let mut staged = Vec::with_capacity(transactions.len());
        for transaction in &transactions {
            let mut notifications = Vec::new();
            if let Err(err) = self.publisher.publish_transaction(transaction, &mut notifications) {
                return Ok(unprocessable(err));
            }
            staged.push(notifications);
        }

        let mut result = self.apply(&header, height, delta)?;
        if result.is_failure() {
            return Ok(result.into());
        }

        for notifications in &staged {
            let mut nested = delta.nested();
            let outcome = self.apply(notifications, height, &mut nested)?;
            if outcome.is_failure() {
                return Ok(outcome.into());
            }
            delta.absorb(nested)?;
            result = result.aggregate(outcome);
        }

        Ok(result.into())
    }

    /// Validate each notification against `delta`, then observe it into `delta`.
    fn apply(
        &self,
        notifications: &[Notification<'_>],
        height: Height,
        delta: &mut CacheDelta,
    ) -> Result<ValidationResult> {
        let grouping = self.config.chain.importance_grouping;
        let mut result = ValidationResult::Success;
        for notification in notifications {
            let context = ValidatorContext::new(height, grouping, delta.to_read_only());
            let outcome = self.engine.validate(notification, &context);
            if outcome.is_failure() {
                return Ok(outcome);
            }
            result = result.aggregate(outcome);
            match self.observer.notify(notification, height, delta) {
                Ok(()) => {}
                Err(CacheError::BalanceOverflow(asset_id)) => {
                    tracing::warn!(%asset_id, "credit overflow");
                    return Ok(FailureCode::BalanceOverflow.into());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(result)
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.config)
            .field("version", &self.cache.version())
            .field("projection", &self.projection.is_some())
            .finish_non_exhaustive()
    }
}

fn unprocessable(error: PluginError) -> Verdict {
    tracing::warn!(%error, "unprocessable entity");
    Verdict::Unprocessable(error)
}
