//! Immutable registry mapping entity types to plugins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ledger_kernel_core::EntityType;

use crate::error::{PluginError, Result};
use crate::traits::{EmbeddedTransactionPlugin, TransactionPlugin};

/// Plugins keyed by entity type, assembled once by [`TransactionRegistryBuilder`].
#[derive(Clone, Default)]
pub struct TransactionRegistry {
    plugins: BTreeMap<EntityType, Arc<dyn TransactionPlugin>>,
}

impl TransactionRegistry {
    pub fn builder() -> TransactionRegistryBuilder {
        TransactionRegistryBuilder::default()
    }

    /// Look up a plugin; `None` for unregistered types.
    pub fn find(&self, entity_type: EntityType) -> Option<&dyn TransactionPlugin> {
        self.plugins.get(&entity_type).map(|plugin| plugin.as_ref())
    }

    /// Look up a plugin, failing for unregistered types.
    pub fn resolve(&self, entity_type: EntityType) -> Result<&dyn TransactionPlugin> {
        self.find(entity_type)
            .ok_or(PluginError::UnknownType(entity_type))
    }

    /// Look up the embedded form of a plugin.
    ///
    /// An unregistered type is [`PluginError::UnknownType`]; a registered type that
    /// cannot be embedded is [`PluginError::EmbeddingNotSupported`].
    pub fn resolve_embedded(
        &self,
        entity_type: EntityType,
    ) -> Result<&dyn EmbeddedTransactionPlugin> {
        self.resolve(entity_type)?.embedded_plugin()
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.plugins.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for TransactionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRegistry")
            .field("entity_types", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`TransactionRegistry`].
#[derive(Default)]
pub struct TransactionRegistryBuilder {
    plugins: BTreeMap<EntityType, Arc<dyn TransactionPlugin>>,
}

impl TransactionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin; fails if its type is already registered.
    pub fn with(self, plugin: impl TransactionPlugin + 'static) -> Result<Self> {
        self.with_shared(Arc::new(plugin))
    }

    /// Add a shared plugin; fails if its type is already registered.
    pub fn with_shared(mut self, plugin: Arc<dyn TransactionPlugin>) -> Result<Self> {
        let entity_type = plugin.entity_type();
        if self.plugins.contains_key(&entity_type) {
            return Err(PluginError::DuplicateType(entity_type));
        }
        self.plugins.insert(entity_type, plugin);
        Ok(self)
    }

    /// Freeze into an immutable, shareable registry.
    pub fn build(self) -> Arc<TransactionRegistry> {
        Arc::new(TransactionRegistry {
            plugins: self.plugins,
        })
    }
}
