//! Error types for the plugins module.

use ledger_kernel_core::{EntityError, EntityType};
use thiserror::Error;

/// Errors that can occur while decomposing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// The entity buffer is malformed.
    #[error("malformed entity: {0}")]
    Entity(#[from] EntityError),

    /// No plugin handles the entity type.
    #[error("no plugin registered for entity type {0}")]
    UnknownType(EntityType),

    /// An embedding-only operation was requested from a plugin that cannot be embedded.
    #[error("entity type {0} does not support embedding")]
    EmbeddingNotSupported(EntityType),

    /// Two plugins were registered for one entity type.
    #[error("duplicate plugin for entity type {0}")]
    DuplicateType(EntityType),
}

impl PluginError {
    /// Whether the error is caused by bad input rather than an integration bug.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::UnknownType(_))
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
