//! Plugins for transaction types with a fixed-size body.
//!
//! The same body appears in a top-level transaction and in an embedded one, so
//! a single [`FixedBodyPlugin`] serves both forms.

use std::fmt;
use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use ledger_kernel_core::{
    EmbeddedTransaction, EntityError, EntityReader, EntityType, Notification, NotificationSink,
    PublicKey, Transaction, EMBEDDED_HEADER_SIZE, TRANSACTION_HEADER_SIZE,
};

use crate::error::Result;
use crate::traits::{EmbeddedTransactionPlugin, TransactionPlugin};

/// A fixed-size transaction body.
pub trait FixedBody: Sized + Send + Sync + 'static {
    const ENTITY_TYPE: EntityType;
    const SIZE: usize;

    fn read(reader: &mut EntityReader<'_>) -> std::result::Result<Self, EntityError>;

    fn write(&self, buf: &mut BytesMut);

    /// Publish the body's notifications on behalf of `signer`.
    fn publish_body<'a>(&self, signer: PublicKey, sink: &mut dyn NotificationSink<'a>);

    /// Parse a body that must be exactly [`Self::SIZE`] bytes.
    fn parse(body: &[u8]) -> std::result::Result<Self, EntityError> {
        if body.len() != Self::SIZE {
            return Err(EntityError::SizeMismatch {
                declared: Self::SIZE as u64,
                actual: body.len() as u64,
            });
        }
        Self::read(&mut EntityReader::new(body))
    }

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.write(&mut buf);
        buf.freeze()
    }
}

/// Plugin for a [`FixedBody`] type, embeddable.
pub struct FixedBodyPlugin<B> {
    _body: PhantomData<fn() -> B>,
}

impl<B> FixedBodyPlugin<B> {
    pub const fn new() -> Self {
        Self { _body: PhantomData }
    }
}

impl<B> Default for FixedBodyPlugin<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FixedBody> fmt::Debug for FixedBodyPlugin<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedBodyPlugin({})", B::ENTITY_TYPE)
    }
}

impl<B: FixedBody> TransactionPlugin for FixedBodyPlugin<B> {
    fn entity_type(&self) -> EntityType {
        B::ENTITY_TYPE
    }

    fn calculate_real_size(&self, _transaction: &Transaction) -> Option<u64> {
        Some((TRANSACTION_HEADER_SIZE + B::SIZE) as u64)
    }

    fn publish<'a>(
        &self,
        transaction: &'a Transaction,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()> {
        let body = B::parse(transaction.body())?;
        body.publish_body(transaction.signer(), sink);
        Ok(())
    }

    fn supports_embedding(&self) -> bool {
        true
    }

    fn embedded_plugin(&self) -> Result<&dyn EmbeddedTransactionPlugin> {
        Ok(self)
    }
}

impl<B: FixedBody> EmbeddedTransactionPlugin for FixedBodyPlugin<B> {
    fn entity_type(&self) -> EntityType {
        B::ENTITY_TYPE
    }

    fn calculate_real_size(&self, _transaction: &EmbeddedTransaction<'_>) -> Option<u64> {
        Some((EMBEDDED_HEADER_SIZE + B::SIZE) as u64)
    }

    fn publish<'a>(
        &self,
        transaction: &EmbeddedTransaction<'a>,
        sink: &mut dyn NotificationSink<'a>,
    ) -> Result<()> {
        let body = B::parse(transaction.body())?;
        let signer = transaction.signer();
        sink.notify(Notification::account(signer));
        body.publish_body(signer, sink);
        Ok(())
    }
}
