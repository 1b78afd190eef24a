//! End-to-end block processing: validation, observation, commit and projection.

use std::sync::Arc;

use bytes::Bytes;
use tempfile::tempdir;

use ledger_kernel::cache::{
    AccountState, DifficultyHistoryStorage, ImportanceInfo, LedgerCache, SqliteDifficultyStorage,
};
use ledger_kernel::core::{
    Amount, ArtifactDuration, ArtifactFlags, ArtifactId, ArtifactProperties, AssetId,
    BlockBuilder, Difficulty, EntityType, Height, Importance, Keypair, PublicKey, Timestamp,
    Transaction, TransactionBuilder,
};
use ledger_kernel::plugins::{ArtifactDefinitionBody, FixedBody, TransferBody};
use ledger_kernel::{
    BlockOutcome, ChainConfiguration, FailureCode, Kernel, KernelConfig, KernelError, Verdict,
};

struct Chain {
    kernel: Kernel,
    harvester: Keypair,
    alice: Keypair,
    bob: Keypair,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn chain_with(config: ChainConfiguration) -> Chain {
    init_tracing();
    let harvester = Keypair::generate();
    let alice = Keypair::generate();
    let bob = Keypair::generate();

    let cache = Arc::new(LedgerCache::new());
    let mut delta = cache.create_delta();

    let mut account = AccountState::new(harvester.public_key(), Height(1));
    account.importance = ImportanceInfo::new(Importance(1), Height(0));
    account
        .balances
        .credit(config.primary_asset_id, config.min_harvester_balance)
        .unwrap();
    delta.accounts_mut().insert(harvester.public_key(), account);

    let mut account = AccountState::new(alice.public_key(), Height(1));
    account.balances.credit(AssetId(0), Amount(1000)).unwrap();
    delta.accounts_mut().insert(alice.public_key(), account);

    cache.commit(delta, Height(1)).unwrap();

    let kernel = Kernel::new(KernelConfig::new(config))
        .unwrap()
        .with_cache(cache);
    Chain {
        kernel,
        harvester,
        alice,
        bob,
    }
}

fn chain() -> Chain {
    chain_with(ChainConfiguration::default())
}

fn transfer(sender: &Keypair, recipient: PublicKey, asset_id: u64, amount: u64) -> Transaction {
    let body = TransferBody {
        recipient,
        asset_id: AssetId(asset_id),
        amount: Amount(amount),
    };
    TransactionBuilder::new(EntityType::TRANSFER)
        .body(body.to_bytes())
        .sign(sender)
}

fn define_artifact(owner: &Keypair, artifact_id: u64, duration: u64, supply: u64) -> Transaction {
    let body = ArtifactDefinitionBody {
        artifact_id: ArtifactId(artifact_id),
        properties: ArtifactProperties::new(
            ArtifactFlags::TRANSFERABLE,
            0,
            ArtifactDuration(duration),
        ),
        supply: Amount(supply),
    };
    TransactionBuilder::new(EntityType::ARTIFACT_DEFINITION)
        .body(body.to_bytes())
        .sign(owner)
}

impl Chain {
    fn block(&self, height: u64, transactions: Vec<Transaction>) -> Bytes {
        self.block_signed_by(&self.harvester, height, transactions)
    }

    fn block_signed_by(&self, signer: &Keypair, height: u64, transactions: Vec<Transaction>) -> Bytes {
        let mut builder = BlockBuilder::new(Height(height))
            .timestamp(Timestamp(height * 15_000))
            .difficulty(Difficulty(100_000 + height));
        for transaction in transactions {
            builder = builder.transaction(transaction);
        }
        Bytes::copy_from_slice(builder.sign(signer).as_bytes())
    }

    fn balance(&self, key: &Keypair, asset_id: u64) -> Amount {
        self.kernel
            .cache()
            .create_view()
            .to_read_only()
            .accounts()
            .get(&key.public_key())
            .map(|account| account.balances.get(AssetId(asset_id)))
            .unwrap_or_default()
    }
}

#[tokio::test]
async fn test_block_commits_and_moves_balances() {
    let chain = chain();
    let block = chain.block(2, vec![transfer(&chain.alice, chain.bob.public_key(), 0, 300)]);

    let outcome = chain.kernel.process_block(block).await.unwrap();
    match outcome {
        BlockOutcome::Committed(summary) => {
            assert_eq!(Height(2), summary.version);
            assert_eq!(1, summary.difficulties_added.len());
            assert_eq!(Difficulty(100_002), summary.difficulties_added[0].difficulty);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(Height(2), chain.kernel.cache().version());
    assert_eq!(Amount(700), chain.balance(&chain.alice, 0));
    assert_eq!(Amount(300), chain.balance(&chain.bob, 0));
}

#[tokio::test]
async fn test_later_transactions_see_earlier_ones() {
    let chain = chain();
    let carol = PublicKey([0xc0; 32]);
    let block = chain.block(
        2,
        vec![
            transfer(&chain.alice, chain.bob.public_key(), 0, 300),
            transfer(&chain.bob, carol, 0, 200),
        ],
    );

    assert!(chain.kernel.process_block(block).await.unwrap().is_committed());
    assert_eq!(Amount(100), chain.balance(&chain.bob, 0));
}

#[tokio::test]
async fn test_failed_transaction_discards_block() {
    let chain = chain();
    let view_before = chain.kernel.cache().create_view();
    let block = chain.block(
        2,
        vec![
            transfer(&chain.alice, chain.bob.public_key(), 0, 300),
            transfer(&chain.alice, chain.bob.public_key(), 0, 800),
        ],
    );

    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::InsufficientBalance)),
        chain.kernel.process_block(block).await.unwrap()
    );
    assert_eq!(Height(1), chain.kernel.cache().version());
    assert_eq!(Amount(1000), chain.balance(&chain.alice, 0));
    assert_eq!(Height(1), view_before.version());
}

#[tokio::test]
async fn test_ineligible_harvester() {
    let chain = chain();
    let stranger = Keypair::generate();
    let block = chain.block_signed_by(&stranger, 2, Vec::new());

    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::HarvesterIneligible)),
        chain.kernel.process_block(block).await.unwrap()
    );
}

#[tokio::test]
async fn test_out_of_order_block() {
    let chain = chain();
    let block = chain.block(5, Vec::new());

    assert!(matches!(
        chain.kernel.process_block(block).await,
        Err(KernelError::Cache(_))
    ));
    assert_eq!(Height(1), chain.kernel.cache().version());
}

#[tokio::test]
async fn test_malformed_block_is_unprocessable() {
    let chain = chain();
    let mut bytes = chain.block(2, Vec::new()).to_vec();
    bytes.truncate(120);

    let outcome = chain.kernel.process_block(bytes).await.unwrap();
    assert!(matches!(
        outcome,
        BlockOutcome::Rejected(Verdict::Unprocessable(_))
    ));
}

#[test]
fn test_validate_block_does_not_commit() {
    let chain = chain();
    let block = chain.block(2, vec![transfer(&chain.alice, chain.bob.public_key(), 0, 10)]);

    assert_eq!(Verdict::Accepted, chain.kernel.validate_block(block).unwrap());
    assert_eq!(Height(1), chain.kernel.cache().version());
    assert_eq!(Amount(1000), chain.balance(&chain.alice, 0));
}

#[tokio::test]
async fn test_artifact_expires_after_duration() {
    let chain = chain();
    let kernel = &chain.kernel;

    let block = chain.block(2, vec![define_artifact(&chain.alice, 77, 3, 500)]);
    assert!(kernel.process_block(block).await.unwrap().is_committed());
    assert_eq!(Amount(500), chain.balance(&chain.alice, 77));

    let block = chain.block(3, vec![transfer(&chain.alice, chain.bob.public_key(), 77, 50)]);
    assert!(kernel.process_block(block).await.unwrap().is_committed());
    assert_eq!(Amount(50), chain.balance(&chain.bob, 77));

    let block = chain.block(4, Vec::new());
    assert!(kernel.process_block(block).await.unwrap().is_committed());

    let block = chain.block(5, vec![transfer(&chain.alice, chain.bob.public_key(), 77, 50)]);
    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::ArtifactExpired)),
        kernel.process_block(block).await.unwrap()
    );
}

#[tokio::test]
async fn test_foreign_owner_cannot_redefine_active_artifact() {
    let chain = chain();
    let block = chain.block(2, vec![define_artifact(&chain.alice, 77, 10, 500)]);
    assert!(chain.kernel.process_block(block).await.unwrap().is_committed());

    let block = chain.block(3, vec![define_artifact(&chain.bob, 77, 10, 500)]);
    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::ArtifactOwnerConflict)),
        chain.kernel.process_block(block).await.unwrap()
    );
}

#[tokio::test]
async fn test_supply_overflow_is_rejected() {
    let chain = chain();
    let block = chain.block(2, vec![define_artifact(&chain.alice, 77, u64::MAX, u64::MAX)]);
    assert!(chain.kernel.process_block(block).await.unwrap().is_committed());
    assert_eq!(Amount(u64::MAX), chain.balance(&chain.alice, 77));

    let block = chain.block(3, vec![define_artifact(&chain.alice, 77, u64::MAX, 1)]);
    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::BalanceOverflow)),
        chain.kernel.process_block(block).await.unwrap()
    );
    assert_eq!(Height(2), chain.kernel.cache().version());
    assert_eq!(Amount(u64::MAX), chain.balance(&chain.alice, 77));
}

#[tokio::test]
async fn test_recipient_overflow_is_rejected() {
    let chain = chain();
    let kernel = &chain.kernel;

    let block = chain.block(2, vec![define_artifact(&chain.alice, 77, 0, u64::MAX)]);
    assert!(kernel.process_block(block).await.unwrap().is_committed());
    let block = chain.block(3, vec![transfer(&chain.alice, chain.bob.public_key(), 77, 1)]);
    assert!(kernel.process_block(block).await.unwrap().is_committed());
    let block = chain.block(4, vec![define_artifact(&chain.alice, 77, 0, 1)]);
    assert!(kernel.process_block(block).await.unwrap().is_committed());
    assert_eq!(Amount(u64::MAX), chain.balance(&chain.alice, 77));

    let block = chain.block(5, vec![transfer(&chain.bob, chain.alice.public_key(), 77, 1)]);
    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::BalanceOverflow)),
        kernel.process_block(block).await.unwrap()
    );
    assert_eq!(Height(4), kernel.cache().version());
    assert_eq!(Amount(1), chain.balance(&chain.bob, 77));
}

#[tokio::test]
async fn test_projection_keeps_last_samples() {
    let config = ChainConfiguration {
        difficulty_history_size: 3,
        ..ChainConfiguration::default()
    };
    let dir = tempdir().unwrap();
    let storage = Arc::new(SqliteDifficultyStorage::open(dir.path().join("history.db"), 3).unwrap());

    let mut chain = chain_with(config);
    chain.kernel = chain.kernel.with_projection(storage.clone());

    for height in 2..=7 {
        let block = chain.block(height, Vec::new());
        assert!(chain.kernel.process_block(block).await.unwrap().is_committed());
    }

    let heights: Vec<_> = storage
        .load()
        .await
        .unwrap()
        .into_iter()
        .map(|info| info.height)
        .collect();
    assert_eq!(vec![Height(5), Height(6), Height(7)], heights);

    let view = chain.kernel.cache().create_view();
    let mut cached: Vec<_> = view.difficulties().iter().map(|(height, _)| *height).collect();
    cached.sort();
    assert_eq!(heights, cached);
}
