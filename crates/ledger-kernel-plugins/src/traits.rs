//! Plugin traits: the capability set every entity type provides.

use ledger_kernel_core::{EmbeddedTransaction, EntityType, NotificationSink, Transaction};

use crate::error::{PluginError, Result};

/// Decomposer for one top-level transaction type.
///
/// Implementations never mutate the buffer and publish identical streams for
/// identical input.
pub trait TransactionPlugin: Send + Sync {
    /// The entity type handled by this plugin.
    fn entity_type(&self) -> EntityType;

    /// Size implied by the entity's structure, ignoring the stored size field.
    ///
    /// `None` when the size cannot be determined (malformed or unresolvable parts).
    fn calculate_real_size(&self, transaction: &Transaction) -> Option<u64>;

    /// The contiguous range that is signed and hashed.
    fn data_buffer<'a>(&self, transaction: &'a Transaction) -> Result<&'a [u8]> {
        Ok(transaction.signed_region())
    }

    /// Extra discontiguous ranges folded into the Merkle component hash.
    fn supplementary_buffers<'a>(&self, _transaction: &'a Transaction) -> Result<Vec<&'a [u8]>> {
        Ok(Vec::new())
    }

    /// Publish the type-specific notifications.
    ///
    /// On error nothing has been published.
    fn publish<'a>(
        &self,
        transaction: &'a Transaction,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()>;

    /// Whether transactions of this type may appear inside an aggregate.
    fn supports_embedding(&self) -> bool {
        false
    }

    /// The embedded form of this plugin.
    fn embedded_plugin(&self) -> Result<&dyn EmbeddedTransactionPlugin> {
        Err(PluginError::EmbeddingNotSupported(self.entity_type()))
    }
}

/// Decomposer for one embedded transaction type.
pub trait EmbeddedTransactionPlugin: Send + Sync {
    fn entity_type(&self) -> EntityType;

    /// Size implied by the embedded transaction's structure.
    fn calculate_real_size(&self, transaction: &EmbeddedTransaction<'_>) -> Option<u64>;

    /// Publish the embedded transaction's notifications, including its signer's account.
    ///
    /// On error nothing has been published.
    fn publish<'a>(
        &self,
        transaction: &EmbeddedTransaction<'a>,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()>;
}
