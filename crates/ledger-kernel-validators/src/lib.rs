//! # Ledger Kernel Validators
//!
//! Validation of notification streams.
//!
//! Validators are pure predicates over a notification and, for stateful rules,
//! a [`ValidatorContext`] holding the target height and a read-only cache. The
//! [`ValidatorEngine`] runs the validators registered for each notification kind
//! in registration order and stops at the first failure.
//!
//! ## Key Types
//!
//! - [`ValidationResult`] / [`FailureCode`] - Verdicts and rejection reasons
//! - [`StatelessValidator`] / [`StatefulValidator`] - Rule traits
//! - [`ValidatorEngine`] - Ordered dispatch with short-circuit
//! - [`ValidatingSink`] - Validates notifications as a publisher emits them
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ledger_kernel_cache::LedgerCache;
//! use ledger_kernel_core::{ChainConfiguration, Height};
//! use ledger_kernel_validators::{standard_engine, Ed25519Verifier, ValidatorContext};
//!
//! let config = ChainConfiguration::default();
//! let engine = standard_engine(&config, Some(Arc::new(Ed25519Verifier)));
//!
//! let cache = LedgerCache::new();
//! let view = cache.create_view();
//! let context = ValidatorContext::new(Height(1), config.importance_grouping, view.to_read_only());
//! let result = engine.validate_all(Vec::new(), &context);
//! assert!(result.is_success());
//! ```

use std::sync::Arc;

use ledger_kernel_core::ChainConfiguration;

pub mod context;
pub mod engine;
pub mod result;
pub mod rules;
pub mod traits;

pub use context::ValidatorContext;
pub use engine::{ValidatingSink, ValidatorEngine, ValidatorEngineBuilder};
pub use result::{FailureCode, ValidationResult};
pub use rules::{
    ActiveArtifactValidator, ArtifactDurationValidator, ArtifactOwnershipValidator,
    ArtifactSupplyValidator, BalanceCreditValidator, BalanceTransferValidator,
    BasicAggregateCosignaturesValidator, EligibleHarvesterValidator, SignatureValidator,
    StrictAggregateCosignaturesValidator,
};
pub use traits::{Ed25519Verifier, SignatureVerifier, StatefulValidator, StatelessValidator};

/// The standard rule set for `config`.
///
/// Signature checks are registered only when a verifier is supplied.
pub fn standard_engine(
    config: &ChainConfiguration,
    verifier: Option<Arc<dyn SignatureVerifier>>,
) -> Arc<ValidatorEngine> {
    let mut builder = ValidatorEngine::builder();
    if let Some(verifier) = verifier {
        builder = builder.stateless(SignatureValidator::new(verifier));
    }

    builder
        .stateful(EligibleHarvesterValidator::new(
            config.min_harvester_balance,
            config.primary_asset_id,
        ))
        .stateless(BasicAggregateCosignaturesValidator::new(
            config.max_transactions_per_aggregate,
            config.max_cosignatures_per_aggregate,
        ))
        .stateless(StrictAggregateCosignaturesValidator)
        .stateless(ArtifactDurationValidator::new(config.max_artifact_duration))
        .stateful(ArtifactOwnershipValidator)
        .stateful(ArtifactSupplyValidator)
        .stateful(ActiveArtifactValidator::new(config.primary_asset_id))
        .stateful(BalanceTransferValidator)
        .stateful(BalanceCreditValidator)
        .build()
}
