//! Notifications: the typed facts an entity decomposes into.
//!
//! A notification borrows from the entity it was derived from, so it cannot
//! outlive that entity. Keys and scalars are copied out; buffers, embedded
//! transactions and cosignature regions are borrowed.

use std::collections::HashMap;
use std::fmt;

use crate::artifact::ArtifactProperties;
use crate::crypto::{PublicKey, Signature};
use crate::entity::{Cosignatures, EmbeddedTransaction, EmbeddedTransactions};
use crate::types::{Amount, ArtifactId, AssetId, Difficulty, Height, Timestamp};

/// Discriminant of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationType {
    Block,
    Signature,
    AccountPublicKey,
    AggregateCosignatures,
    AggregateEmbeddedTransaction,
    BalanceTransfer,
    ArtifactDefinition,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Block => "block",
            Self::Signature => "signature",
            Self::AccountPublicKey => "account public key",
            Self::AggregateCosignatures => "aggregate cosignatures",
            Self::AggregateEmbeddedTransaction => "aggregate embedded transaction",
            Self::BalanceTransfer => "balance transfer",
            Self::ArtifactDefinition => "artifact definition",
        };
        f.write_str(name)
    }
}

/// A block was produced by `signer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockNotification {
    pub signer: PublicKey,
    pub height: Height,
    pub timestamp: Timestamp,
    pub difficulty: Difficulty,
}

/// `signer` must have signed `data` with `signature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureNotification<'a> {
    pub signer: PublicKey,
    pub signature: Signature,
    pub data: &'a [u8],
}

/// An account identified by `public_key` is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPublicKeyNotification {
    pub public_key: PublicKey,
}

/// Summary of an aggregate, published before any per-item notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateCosignaturesNotification<'a> {
    pub signer: PublicKey,
    pub transactions: EmbeddedTransactions<'a>,
    pub cosignatures: Cosignatures<'a>,
}

/// One embedded transaction together with the cosignatures backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateEmbeddedTransactionNotification<'a> {
    pub signer: PublicKey,
    pub transaction: EmbeddedTransaction<'a>,
    pub cosignatures: Cosignatures<'a>,
}

/// `amount` of `asset_id` moves from `sender` to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceTransferNotification {
    pub sender: PublicKey,
    pub recipient: PublicKey,
    pub asset_id: AssetId,
    pub amount: Amount,
}

/// `owner` defines (or redefines) the artifact `artifact_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactDefinitionNotification {
    pub owner: PublicKey,
    pub artifact_id: ArtifactId,
    pub properties: ArtifactProperties,
    pub supply: Amount,
}

/// A typed fact derived from an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification<'a> {
    Block(BlockNotification),
    Signature(SignatureNotification<'a>),
    AccountPublicKey(AccountPublicKeyNotification),
    AggregateCosignatures(AggregateCosignaturesNotification<'a>),
    AggregateEmbeddedTransaction(AggregateEmbeddedTransactionNotification<'a>),
    BalanceTransfer(BalanceTransferNotification),
    ArtifactDefinition(ArtifactDefinitionNotification),
}

impl<'a> Notification<'a> {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            Self::Block(_) => NotificationType::Block,
            Self::Signature(_) => NotificationType::Signature,
            Self::AccountPublicKey(_) => NotificationType::AccountPublicKey,
            Self::AggregateCosignatures(_) => NotificationType::AggregateCosignatures,
            Self::AggregateEmbeddedTransaction(_) => NotificationType::AggregateEmbeddedTransaction,
            Self::BalanceTransfer(_) => NotificationType::BalanceTransfer,
            Self::ArtifactDefinition(_) => NotificationType::ArtifactDefinition,
        }
    }

    /// Shorthand for an [`AccountPublicKeyNotification`].
    pub fn account(public_key: PublicKey) -> Self {
        Self::AccountPublicKey(AccountPublicKeyNotification { public_key })
    }
}

/// Append-only, order-preserving consumer of notifications.
pub trait NotificationSink<'a> {
    fn notify(&mut self, notification: Notification<'a>);
}

impl<'a> NotificationSink<'a> for Vec<Notification<'a>> {
    fn notify(&mut self, notification: Notification<'a>) {
        self.push(notification);
    }
}

impl<'a, S: NotificationSink<'a> + ?Sized> NotificationSink<'a> for &mut S {
    fn notify(&mut self, notification: Notification<'a>) {
        (**self).notify(notification);
    }
}

/// Counts notifications by type without retaining them.
#[derive(Debug, Default, Clone)]
pub struct NotificationCounter {
    counts: HashMap<NotificationType, usize>,
    total: usize,
}

impl NotificationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, notification_type: NotificationType) -> usize {
        self.counts.get(&notification_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl<'a> NotificationSink<'a> for NotificationCounter {
    fn notify(&mut self, notification: Notification<'a>) {
        *self.counts.entry(notification.notification_type()).or_default() += 1;
        self.total += 1;
    }
}

/// Forwards only notifications of one type to an inner sink.
#[derive(Debug)]
pub struct FilteringSink<S> {
    notification_type: NotificationType,
    inner: S,
}

impl<S> FilteringSink<S> {
    pub fn new(notification_type: NotificationType, inner: S) -> Self {
        Self {
            notification_type,
            inner,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<'a, S: NotificationSink<'a>> NotificationSink<'a> for FilteringSink<S> {
    fn notify(&mut self, notification: Notification<'a>) {
        if notification.notification_type() == self.notification_type {
            self.inner.notify(notification);
        }
    }
}
