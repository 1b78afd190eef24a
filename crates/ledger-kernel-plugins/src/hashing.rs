//! Entity hashes.
//!
//! The entity hash covers the data buffer only. The Merkle component hash also
//! folds in the supplementary buffers, so a block's transaction tree commits to
//! aggregate cosigners without committing to their signatures.

use ledger_kernel_core::{Block, Hash256, Transaction};

use crate::error::Result;
use crate::traits::TransactionPlugin;

/// Both hashes of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHashes {
    pub entity_hash: Hash256,
    pub merkle_component_hash: Hash256,
}

/// Hash of a signed data buffer.
pub fn entity_hash(data_buffer: &[u8]) -> Hash256 {
    Hash256::hash(data_buffer)
}

/// Hash of an entity hash followed by each supplementary buffer in order.
///
/// Without supplementary buffers this is the entity hash itself.
pub fn merkle_component_hash(entity_hash: Hash256, supplementary: &[&[u8]]) -> Hash256 {
    if supplementary.is_empty() {
        return entity_hash;
    }
    let head = std::iter::once(entity_hash.as_bytes().as_slice());
    Hash256::hash_all(head.chain(supplementary.iter().copied()))
}

/// Compute both hashes of `transaction` with its plugin.
pub fn calculate_hashes(
    plugin: &dyn TransactionPlugin,
    transaction: &Transaction,
) -> Result<TransactionHashes> {
    let entity_hash = entity_hash(plugin.data_buffer(transaction)?);
    let supplementary = plugin.supplementary_buffers(transaction)?;
    Ok(TransactionHashes {
        entity_hash,
        merkle_component_hash: merkle_component_hash(entity_hash, &supplementary),
    })
}

/// Hash of a block header.
pub fn block_hash(block: &Block) -> Hash256 {
    entity_hash(block.header_data())
}
