//! Aggregate transactions: embedded transactions plus detached cosignatures.

use std::sync::Arc;

use ledger_kernel_core::{
    AggregateCosignaturesNotification, AggregateEmbeddedTransactionNotification,
    AggregateTransaction, EmbeddedTransaction, EntityError, EntityType, Notification,
    NotificationSink, SignatureNotification, Transaction, AGGREGATE_HEADER_SIZE, COSIGNATURE_SIZE,
};

use crate::error::Result;
use crate::registry::TransactionRegistry;
use crate::traits::{EmbeddedTransactionPlugin, TransactionPlugin};

/// Plugin for [`EntityType::AGGREGATE`].
///
/// Embedded transactions are resolved against a registry of embeddable plugins.
/// The aggregate itself cannot be embedded.
#[derive(Debug, Clone)]
pub struct AggregatePlugin {
    registry: Arc<TransactionRegistry>,
}

impl AggregatePlugin {
    pub fn new(registry: Arc<TransactionRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the plugin of every embedded transaction and check that each one
    /// is exactly as large as its structure implies.
    fn resolve_all<'a, 'r>(
        &'r self,
        aggregate: &AggregateTransaction<'a>,
    ) -> Result<Vec<(EmbeddedTransaction<'a>, &'r dyn EmbeddedTransactionPlugin)>> {
        aggregate
            .transactions()
            .iter()
            .map(|embedded| {
                let plugin = self.registry.resolve_embedded(embedded.entity_type())?;
                let declared = u64::from(embedded.size());
                match plugin.calculate_real_size(&embedded) {
                    Some(actual) if actual == declared => Ok((embedded, plugin)),
                    Some(actual) => Err(EntityError::SizeMismatch { declared, actual }.into()),
                    None => Err(EntityError::IndeterminateSize.into()),
                }
            })
            .collect()
    }
}

impl TransactionPlugin for AggregatePlugin {
    fn entity_type(&self) -> EntityType {
        EntityType::AGGREGATE
    }

    fn calculate_real_size(&self, transaction: &Transaction) -> Option<u64> {
        let aggregate = AggregateTransaction::parse(transaction).ok()?;

        let mut size = AGGREGATE_HEADER_SIZE as u64;
        for embedded in aggregate.transactions().iter() {
            let plugin = self.registry.resolve_embedded(embedded.entity_type()).ok()?;
            size = size.checked_add(plugin.calculate_real_size(&embedded)?)?;
        }

        let cosignatures = (aggregate.cosignatures().len() * COSIGNATURE_SIZE) as u64;
        size.checked_add(cosignatures)
    }

    fn data_buffer<'a>(&self, transaction: &'a Transaction) -> Result<&'a [u8]> {
        Ok(AggregateTransaction::parse(transaction)?.data_buffer())
    }

    fn supplementary_buffers<'a>(&self, transaction: &'a Transaction) -> Result<Vec<&'a [u8]>> {
        let aggregate = AggregateTransaction::parse(transaction)?;
        Ok(aggregate.cosignatures().signer_buffers().collect())
    }

    fn publish<'a>(
        &self,
        transaction: &'a Transaction,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()> {
        let aggregate = AggregateTransaction::parse(transaction)?;
        let resolved = self.resolve_all(&aggregate)?;

        let signer = aggregate.signer();
        let transactions = aggregate.transactions();
        let cosignatures = aggregate.cosignatures();
        let data = aggregate.data_buffer();

        // Embedded plugins may still fail, so nothing reaches `sink` until all succeed.
        let mut staged = Vec::with_capacity(1 + cosignatures.len() + 3 * resolved.len());
        staged.push(Notification::AggregateCosignatures(
            AggregateCosignaturesNotification {
                signer,
                transactions,
                cosignatures,
            },
        ));

        for cosignature in cosignatures.iter() {
            staged.push(Notification::Signature(SignatureNotification {
                signer: cosignature.signer,
                signature: cosignature.signature,
                data,
            }));
        }

        for (embedded, plugin) in resolved {
            plugin.publish(&embedded, &mut staged)?;
            staged.push(Notification::AggregateEmbeddedTransaction(
                AggregateEmbeddedTransactionNotification {
                    signer,
                    transaction: embedded,
                    cosignatures,
                },
            ));
        }

        for notification in staged {
            sink.notify(notification);
        }
        Ok(())
    }
}
