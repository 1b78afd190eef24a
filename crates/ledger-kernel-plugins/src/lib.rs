//! # Ledger Kernel Plugins
//!
//! Transaction plugins decompose raw entities into notifications. Each plugin
//! knows, for one entity type, how large the entity really is, which bytes are
//! signed, and which facts it publishes.
//!
//! ## Key Types
//!
//! - [`TransactionPlugin`] - Capability set of a top-level transaction type
//! - [`EmbeddedTransactionPlugin`] - Capability set of an embeddable type
//! - [`TransactionRegistry`] - Immutable type-to-plugin table
//! - [`AggregatePlugin`] - Composite transactions with cosignatures
//! - [`NotificationPublisher`] - Entity-level streams for transactions and blocks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_kernel_plugins::{default_registry, NotificationPublisher};
//! use ledger_kernel_core::Transaction;
//!
//! fn example(transaction: &Transaction) {
//!     let publisher = NotificationPublisher::new(default_registry().unwrap());
//!     let mut notifications = Vec::new();
//!     publisher.publish_transaction(transaction, &mut notifications).unwrap();
//! }
//! ```

use std::sync::Arc;

pub mod aggregate;
pub mod artifact;
pub mod body;
pub mod error;
pub mod hashing;
pub mod publisher;
pub mod registry;
pub mod traits;
pub mod transfer;

pub use aggregate::AggregatePlugin;
pub use artifact::{ArtifactDefinitionBody, ArtifactDefinitionPlugin};
pub use body::{FixedBody, FixedBodyPlugin};
pub use error::{PluginError, Result};
pub use hashing::{block_hash, calculate_hashes, entity_hash, merkle_component_hash, TransactionHashes};
pub use publisher::NotificationPublisher;
pub use registry::{TransactionRegistry, TransactionRegistryBuilder};
pub use traits::{EmbeddedTransactionPlugin, TransactionPlugin};
pub use transfer::{TransferBody, TransferPlugin};

/// Registry of the plugins that may appear inside an aggregate.
pub fn default_embedded_registry() -> Result<Arc<TransactionRegistry>> {
    Ok(TransactionRegistry::builder()
        .with(TransferPlugin::new())?
        .with(ArtifactDefinitionPlugin::new())?
        .build())
}

/// Registry of all standard top-level plugins.
pub fn default_registry() -> Result<Arc<TransactionRegistry>> {
    let embedded = default_embedded_registry()?;
    Ok(TransactionRegistry::builder()
        .with(TransferPlugin::new())?
        .with(ArtifactDefinitionPlugin::new())?
        .with(AggregatePlugin::new(embedded))?
        .build())
}
