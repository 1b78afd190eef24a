//! Mock plugins for decomposition tests.
//!
//! [`MockBody`] is the smallest embeddable body: a single recipient key. Its
//! embedded form publishes two account notifications (signer, then recipient),
//! so an aggregate of `k` mocks with `m` cosignatures publishes `1 + m + 3k`
//! notifications.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use ledger_kernel_core::{
    AggregateBuilder, Cosignature, EmbeddedTransactionBuilder, EntityError, EntityReader,
    EntityType, Keypair, Notification, NotificationSink, PublicKey, Signature, Transaction,
};
use ledger_kernel_plugins::{
    AggregatePlugin, FixedBody, FixedBodyPlugin, Result, TransactionRegistry,
};

/// Entity type of [`MockBody`].
pub const MOCK_ENTITY_TYPE: EntityType = EntityType(0x4d4f);

/// Notifications published by one embedded mock transaction inside an aggregate,
/// including the aggregate's per-transaction notification.
pub const NOTIFICATIONS_PER_EMBEDDED_MOCK: usize = 3;

/// Plugin for [`MOCK_ENTITY_TYPE`].
pub type MockPlugin = FixedBodyPlugin<MockBody>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBody {
    pub recipient: PublicKey,
}

impl FixedBody for MockBody {
    const ENTITY_TYPE: EntityType = MOCK_ENTITY_TYPE;
    const SIZE: usize = 32;

    fn read(reader: &mut EntityReader<'_>) -> std::result::Result<Self, EntityError> {
        Ok(Self {
            recipient: PublicKey(reader.read_array()?),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(self.recipient.as_bytes());
    }

    fn publish_body<'a>(&self, _signer: PublicKey, sink: &mut dyn NotificationSink<'a>) {
        sink.notify(Notification::account(self.recipient));
    }
}

/// Registry holding the mock plugin and an aggregate that embeds it.
pub fn mock_registry() -> Result<Arc<TransactionRegistry>> {
    let embedded = TransactionRegistry::builder()
        .with(MockPlugin::new())?
        .build();
    Ok(TransactionRegistry::builder()
        .with(MockPlugin::new())?
        .with(AggregatePlugin::new(embedded))?
        .build())
}

/// Aggregate plugin over the mock registry alone.
pub fn mock_aggregate_plugin() -> Result<AggregatePlugin> {
    let embedded = TransactionRegistry::builder()
        .with(MockPlugin::new())?
        .build();
    Ok(AggregatePlugin::new(embedded))
}

/// Encode an embedded mock transaction.
pub fn embedded_mock(signer: PublicKey, recipient: PublicKey) -> Bytes {
    EmbeddedTransactionBuilder::new(signer, MOCK_ENTITY_TYPE)
        .body(MockBody { recipient }.to_bytes())
        .build()
}

/// Builds aggregates of mock transactions with placeholder cosignatures.
///
/// Cosignatures are not real signatures; the result is suitable for
/// decomposition, not for signature validation.
#[derive(Debug, Clone)]
pub struct MockAggregateBuilder {
    signer: Keypair,
    embedded_signers: Vec<PublicKey>,
    cosigners: Vec<PublicKey>,
    unregistered: Option<EntityType>,
}

impl MockAggregateBuilder {
    pub fn new(signer: Keypair) -> Self {
        Self {
            signer,
            embedded_signers: Vec::new(),
            cosigners: Vec::new(),
            unregistered: None,
        }
    }

    /// Add `count` embedded mocks with distinct signers.
    pub fn embedded(mut self, count: usize) -> Self {
        let start = self.embedded_signers.len();
        self.embedded_signers
            .extend((start..start + count).map(|i| numbered_key(0x10, i)));
        self
    }

    /// Add `count` cosignatures with distinct cosigners.
    pub fn cosignatures(mut self, count: usize) -> Self {
        let start = self.cosigners.len();
        self.cosigners
            .extend((start..start + count).map(|i| numbered_key(0x80, i)));
        self
    }

    /// Append one embedded transaction whose type no plugin handles.
    pub fn unregistered(mut self, entity_type: EntityType) -> Self {
        self.unregistered = Some(entity_type);
        self
    }

    pub fn cosigner_keys(&self) -> &[PublicKey] {
        &self.cosigners
    }

    pub fn build(self) -> Transaction {
        let mut builder = AggregateBuilder::new();
        for (i, signer) in self.embedded_signers.iter().enumerate() {
            builder = builder.transaction(embedded_mock(*signer, numbered_key(0x40, i)));
        }
        if let Some(entity_type) = self.unregistered {
            builder = builder.transaction(
                EmbeddedTransactionBuilder::new(numbered_key(0x70, 0), entity_type)
                    .body(vec![0u8; MockBody::SIZE])
                    .build(),
            );
        }
        for (i, signer) in self.cosigners.iter().enumerate() {
            builder = builder.cosignature(Cosignature {
                signer: *signer,
                signature: Signature([i as u8; 64]),
            });
        }
        builder.sign(&self.signer, &[])
    }
}

/// A deterministic key distinct for every `(tag, index)` with `index < 2^24`.
fn numbered_key(tag: u8, index: usize) -> PublicKey {
    let mut key = [tag; 32];
    key[29..].copy_from_slice(&(index as u32).to_le_bytes()[..3]);
    PublicKey(key)
}
