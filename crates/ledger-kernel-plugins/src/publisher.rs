//! Entity-level notification publishing.

use std::sync::Arc;

use ledger_kernel_core::{
    Block, BlockNotification, EntityError, Notification, NotificationSink, SignatureNotification,
    Transaction,
};

use crate::error::Result;
use crate::registry::TransactionRegistry;
use crate::traits::TransactionPlugin;

/// Publishes the full notification stream of transactions and blocks.
///
/// A transaction publishes its signer's account and signature before the
/// plugin's notifications. Every check runs before the first notification
/// reaches the sink, so a failed call publishes nothing.
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    registry: Arc<TransactionRegistry>,
}

impl NotificationPublisher {
    pub fn new(registry: Arc<TransactionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    /// Resolve the plugin for `transaction` and check its real size against the
    /// declared size.
    pub fn check_transaction(&self, transaction: &Transaction) -> Result<&dyn TransactionPlugin> {
        let plugin = self.registry.resolve(transaction.entity_type())?;
        let declared = u64::from(transaction.size());
        match plugin.calculate_real_size(transaction) {
            Some(actual) if actual == declared => Ok(plugin),
            Some(actual) => Err(EntityError::SizeMismatch { declared, actual }.into()),
            None => Err(EntityError::IndeterminateSize.into()),
        }
    }

    fn stage<'a>(&self, transaction: &'a Transaction) -> Result<Vec<Notification<'a>>> {
        let plugin = self.registry.resolve(transaction.entity_type())?;
        let data = plugin.data_buffer(transaction)?;

        let mut staged = vec![
            Notification::account(transaction.signer()),
            Notification::Signature(SignatureNotification {
                signer: transaction.signer(),
                signature: transaction.signature(),
                data,
            }),
        ];
        plugin.publish(transaction, &mut staged)?;
        self.check_transaction(transaction)?;
        Ok(staged)
    }

    /// Publish one transaction.
    pub fn publish_transaction<'a>(
        &self,
        transaction: &'a Transaction,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()> {
        for notification in self.stage(transaction)? {
            sink.notify(notification);
        }
        Ok(())
    }

    /// Publish the block-level notifications: the block itself, then its signer's
    /// account and header signature.
    pub fn publish_block_header<'a>(&self, block: &'a Block, sink: &mut dyn NotificationSink<'a>) {
        let signer = block.signer();
        sink.notify(Notification::Block(BlockNotification {
            signer,
            height: block.height(),
            timestamp: block.timestamp(),
            difficulty: block.difficulty(),
        }));
        sink.notify(Notification::account(signer));
        sink.notify(Notification::Signature(SignatureNotification {
            signer,
            signature: block.signature(),
            data: block.header_data(),
        }));
    }

    /// Publish a block header followed by each of its transactions.
    ///
    /// `transactions` are the block's transactions, decoded by the caller so the
    /// notifications can borrow from them.
    pub fn publish_block<'a>(
        &self,
        block: &'a Block,
        transactions: &'a [Transaction],
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()> {
        let mut staged = Vec::new();
        for transaction in transactions {
            staged.extend(self.stage(transaction)?);
        }

        self.publish_block_header(block, sink);
        for notification in staged {
            sink.notify(notification);
        }
        Ok(())
    }
}
