//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a cache seeded with an eligible
//! harvester and funded accounts, plus builders for signed entities.

use std::sync::Arc;

use bytes::Bytes;
use ledger_kernel::{Kernel, KernelConfig};
use ledger_kernel_cache::{AccountState, ImportanceInfo, LedgerCache};
use ledger_kernel_core::{
    AggregateBuilder, Amount, ArtifactDuration, ArtifactFlags, ArtifactId, ArtifactProperties,
    AssetId, BlockBuilder, ChainConfiguration, Difficulty, EmbeddedTransactionBuilder, EntityType,
    Height, Importance, Keypair, PublicKey, Timestamp, Transaction, TransactionBuilder,
};
use ledger_kernel_plugins::{ArtifactDefinitionBody, FixedBody, TransferBody};

/// Height of the seeded state. The first block processed is the next one.
pub const GENESIS_HEIGHT: Height = Height(1);

/// Primary-asset balance given to each funded account.
pub const INITIAL_BALANCE: Amount = Amount(1_000_000);

/// A chain with a seeded cache, one harvester and a set of funded accounts.
pub struct ChainFixture {
    pub config: ChainConfiguration,
    pub harvester: Keypair,
    pub accounts: Vec<Keypair>,
    pub cache: Arc<LedgerCache>,
}

impl ChainFixture {
    /// Default configuration with `count` funded accounts.
    pub fn new(count: usize) -> Self {
        Self::with_config(ChainConfiguration::default(), count)
    }

    /// Seed a cache at [`GENESIS_HEIGHT`] for `config`.
    ///
    /// The harvester holds exactly the minimum harvesting balance and an
    /// importance effective at height 0.
    pub fn with_config(config: ChainConfiguration, count: usize) -> Self {
        let harvester = Keypair::from_seed(&[0xaa; 32]);
        let accounts = funded_keypairs(count);

        let cache = Arc::new(LedgerCache::new());
        let mut delta = cache.create_delta();

        let mut state = AccountState::new(harvester.public_key(), GENESIS_HEIGHT);
        state.importance = ImportanceInfo::new(Importance(1), Height(0));
        seed_balance(&mut state, config.primary_asset_id, config.min_harvester_balance);
        delta.accounts_mut().insert(harvester.public_key(), state);

        for keypair in &accounts {
            let mut state = AccountState::new(keypair.public_key(), GENESIS_HEIGHT);
            seed_balance(&mut state, config.primary_asset_id, INITIAL_BALANCE);
            delta.accounts_mut().insert(keypair.public_key(), state);
        }

        // A fresh cache at version 0 always accepts its first commit.
        if let Err(err) = cache.commit(delta, GENESIS_HEIGHT) {
            panic!("seeding fixture cache: {err}");
        }

        Self {
            config,
            harvester,
            accounts,
            cache,
        }
    }

    /// A kernel over this fixture's cache.
    pub fn kernel(&self) -> Kernel {
        self.kernel_with(KernelConfig::new(self.config.clone()))
    }

    pub fn kernel_with(&self, config: KernelConfig) -> Kernel {
        match Kernel::new(config) {
            Ok(kernel) => kernel.with_cache(Arc::clone(&self.cache)),
            Err(err) => panic!("fixture configuration rejected: {err}"),
        }
    }

    pub fn account(&self, index: usize) -> &Keypair {
        &self.accounts[index]
    }

    /// Balance of `key` in `asset_id` at the committed version.
    pub fn balance(&self, key: &PublicKey, asset_id: AssetId) -> Amount {
        let view = self.cache.create_view();
        let cache = view.to_read_only();
        cache
            .accounts()
            .get(key)
            .map(|state| state.balances.get(asset_id))
            .unwrap_or_default()
    }

    pub fn version(&self) -> Height {
        self.cache.version()
    }

    /// A block at `height` signed by the harvester.
    pub fn block(&self, height: Height, transactions: Vec<Transaction>) -> Bytes {
        block(&self.harvester, height, transactions)
    }

    /// The block that follows the committed version.
    pub fn next_block(&self, transactions: Vec<Transaction>) -> Bytes {
        match self.version().checked_next() {
            Some(height) => self.block(height, transactions),
            None => panic!("fixture cache has no next height"),
        }
    }
}

fn seed_balance(state: &mut AccountState, asset_id: AssetId, amount: Amount) {
    if let Err(err) = state.balances.credit(asset_id, amount) {
        panic!("seeding balance: {err}");
    }
}

/// Deterministic keypairs for multi-party tests.
pub fn funded_keypairs(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
            Keypair::from_seed(&seed)
        })
        .collect()
}

/// A random key with no account behind it.
pub fn random_public_key() -> PublicKey {
    PublicKey(rand::random())
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity builders
// ─────────────────────────────────────────────────────────────────────────────

/// A signed block with a deterministic timestamp and difficulty.
pub fn block(harvester: &Keypair, height: Height, transactions: Vec<Transaction>) -> Bytes {
    let mut builder = BlockBuilder::new(height)
        .timestamp(Timestamp(height.0 * 15_000))
        .difficulty(Difficulty(100_000 + height.0));
    for transaction in transactions {
        builder = builder.transaction(transaction);
    }
    Bytes::copy_from_slice(builder.sign(harvester).as_bytes())
}

pub fn transfer_body(recipient: PublicKey, asset_id: AssetId, amount: Amount) -> TransferBody {
    TransferBody {
        recipient,
        asset_id,
        amount,
    }
}

/// A signed transfer.
pub fn transfer(
    sender: &Keypair,
    recipient: PublicKey,
    asset_id: AssetId,
    amount: Amount,
) -> Transaction {
    TransactionBuilder::new(EntityType::TRANSFER)
        .body(transfer_body(recipient, asset_id, amount).to_bytes())
        .sign(sender)
}

/// An encoded embedded transfer signed (by structure) by `sender`.
pub fn embedded_transfer(
    sender: PublicKey,
    recipient: PublicKey,
    asset_id: AssetId,
    amount: Amount,
) -> Bytes {
    EmbeddedTransactionBuilder::new(sender, EntityType::TRANSFER)
        .body(transfer_body(recipient, asset_id, amount).to_bytes())
        .build()
}

pub fn artifact_body(
    artifact_id: ArtifactId,
    duration: ArtifactDuration,
    supply: Amount,
) -> ArtifactDefinitionBody {
    ArtifactDefinitionBody {
        artifact_id,
        properties: ArtifactProperties::new(ArtifactFlags::TRANSFERABLE, 0, duration),
        supply,
    }
}

/// A signed artifact definition owned by `owner`.
pub fn define_artifact(
    owner: &Keypair,
    artifact_id: ArtifactId,
    duration: ArtifactDuration,
    supply: Amount,
) -> Transaction {
    TransactionBuilder::new(EntityType::ARTIFACT_DEFINITION)
        .body(artifact_body(artifact_id, duration, supply).to_bytes())
        .sign(owner)
}

/// A fully cosigned aggregate of embedded transfers.
///
/// `transfers` are `(sender, recipient, amount)` in the primary asset. The
/// caller passes every embedded sender other than `signer` as a cosigner.
pub fn cosigned_transfers(
    signer: &Keypair,
    cosigners: &[&Keypair],
    transfers: &[(PublicKey, PublicKey, Amount)],
) -> Transaction {
    let mut builder = AggregateBuilder::new();
    for (sender, recipient, amount) in transfers {
        builder = builder.transaction(embedded_transfer(*sender, *recipient, AssetId(0), *amount));
    }
    builder.sign(signer, cosigners)
}
