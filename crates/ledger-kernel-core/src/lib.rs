//! # Ledger Kernel Core
//!
//! Pure primitives for the Ledger Kernel: entity layout, notifications and
//! artifact lifecycle rules.
//!
//! This crate contains no I/O and no state. It reads untrusted entity buffers
//! and describes them as typed facts.
//!
//! ## Key Types
//!
//! - [`Transaction`] / [`Block`] - Owned, size-checked entity buffers
//! - [`AggregateTransaction`] - Zero-copy view of a composite transaction
//! - [`Notification`] - A typed fact borrowed from an entity
//! - [`ArtifactDefinition`] - A created artifact and its lifecycle predicates
//! - [`ChainConfiguration`] - Network parameters
//!
//! ## Layout
//!
//! All entities are little-endian and self-sized. See [`entity`] module.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod notification;
pub mod types;

pub use artifact::{ArtifactDefinition, ArtifactFlags, ArtifactProperties};
pub use builder::{AggregateBuilder, BlockBuilder, EmbeddedTransactionBuilder, TransactionBuilder};
pub use config::ChainConfiguration;
pub use crypto::{Hash256, Keypair, PublicKey, Signature, HASH_SIZE, KEY_SIZE, SIGNATURE_SIZE};
pub use entity::{
    AggregateTransaction, Block, BlockTransactions, Cosignature, Cosignatures,
    EmbeddedTransaction, EmbeddedTransactions, EntityReader, Transaction,
    AGGREGATE_HEADER_SIZE, BLOCK_HEADER_SIZE, COSIGNATURE_SIZE, EMBEDDED_HEADER_SIZE,
    TRANSACTION_HEADER_SIZE, VERIFIABLE_HEADER_SIZE,
};
pub use error::{CoreError, EntityError, Result};
pub use notification::{
    AccountPublicKeyNotification, AggregateCosignaturesNotification,
    AggregateEmbeddedTransactionNotification, ArtifactDefinitionNotification,
    BalanceTransferNotification, BlockNotification, FilteringSink, Notification,
    NotificationCounter, NotificationSink, NotificationType, SignatureNotification,
};
pub use types::{
    convert_to_importance_height, Amount, ArtifactDuration, ArtifactId, AssetId, Difficulty,
    EntityType, Height, Importance, Timestamp,
};
