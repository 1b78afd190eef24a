//! Fixture-driven block scenarios.

use bytes::Bytes;

use ledger_kernel::{BlockOutcome, FailureCode, KernelConfig, Verdict};
use ledger_kernel_core::{Amount, ArtifactDuration, ArtifactId, AssetId, Height};
use ledger_kernel_testkit::fixtures::{
    cosigned_transfers, define_artifact, random_public_key, transfer, ChainFixture,
};
use ledger_kernel_testkit::INITIAL_BALANCE;

const PRIMARY: AssetId = AssetId(0);

#[tokio::test]
async fn test_cosigned_aggregate_block() {
    let fixture = ChainFixture::new(3);
    let kernel = fixture.kernel();
    let (a, b, c) = (fixture.account(0), fixture.account(1), fixture.account(2));

    let tx = cosigned_transfers(
        a,
        &[b],
        &[
            (a.public_key(), c.public_key(), Amount(10)),
            (b.public_key(), c.public_key(), Amount(20)),
        ],
    );
    let outcome = kernel.process_block(fixture.next_block(vec![tx])).await.unwrap();

    assert!(outcome.is_committed());
    assert_eq!(Amount(INITIAL_BALANCE.0 + 30), fixture.balance(&c.public_key(), PRIMARY));
    assert_eq!(Amount(INITIAL_BALANCE.0 - 20), fixture.balance(&b.public_key(), PRIMARY));
}

#[tokio::test]
async fn test_missing_cosigner_rejects_block() {
    let fixture = ChainFixture::new(3);
    let kernel = fixture.kernel();
    let (a, b, c) = (fixture.account(0), fixture.account(1), fixture.account(2));

    let tx = cosigned_transfers(
        a,
        &[],
        &[
            (a.public_key(), c.public_key(), Amount(10)),
            (b.public_key(), c.public_key(), Amount(20)),
        ],
    );
    let outcome = kernel.process_block(fixture.next_block(vec![tx])).await.unwrap();

    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::MissingCosignatures)),
        outcome
    );
    assert_eq!(INITIAL_BALANCE, fixture.balance(&c.public_key(), PRIMARY));
}

#[tokio::test]
async fn test_harvester_balance_threshold() {
    let fixture = ChainFixture::new(0);

    let mut chain = fixture.config.clone();
    chain.min_harvester_balance = Amount(chain.min_harvester_balance.0 + 1);
    let strict = fixture.kernel_with(KernelConfig::new(chain));
    assert_eq!(
        BlockOutcome::Rejected(Verdict::Rejected(FailureCode::HarvesterIneligible)),
        strict.process_block(fixture.next_block(Vec::new())).await.unwrap()
    );

    let kernel = fixture.kernel();
    assert!(kernel
        .process_block(fixture.next_block(Vec::new()))
        .await
        .unwrap()
        .is_committed());
}

#[tokio::test]
async fn test_views_straddle_commit() {
    let fixture = ChainFixture::new(1);
    let kernel = fixture.kernel();
    let recipient = random_public_key();

    let before = fixture.cache.create_view();
    let tx = transfer(fixture.account(0), recipient, PRIMARY, Amount(5));
    assert!(kernel
        .process_block(fixture.next_block(vec![tx]))
        .await
        .unwrap()
        .is_committed());
    let after = fixture.cache.create_view();

    assert_eq!(Height(1), before.version());
    assert!(!before.to_read_only().accounts().contains(&recipient));
    assert_eq!(Height(2), after.version());
    assert!(after.to_read_only().accounts().contains(&recipient));
}

#[tokio::test]
async fn test_artifact_supply_moves_with_transfers() {
    let fixture = ChainFixture::new(2);
    let kernel = fixture.kernel();
    let (owner, holder) = (fixture.account(0), fixture.account(1));
    let asset = ArtifactId(9).as_asset();

    let tx = define_artifact(owner, ArtifactId(9), ArtifactDuration::ETERNAL, Amount(100));
    assert!(kernel.process_block(fixture.next_block(vec![tx])).await.unwrap().is_committed());

    let tx = transfer(owner, holder.public_key(), asset, Amount(40));
    assert!(kernel.process_block(fixture.next_block(vec![tx])).await.unwrap().is_committed());

    assert_eq!(Amount(60), fixture.balance(&owner.public_key(), asset));
    assert_eq!(Amount(40), fixture.balance(&holder.public_key(), asset));
}

#[test]
fn test_unknown_artifact_transfer_is_rejected() {
    let fixture = ChainFixture::new(2);
    let kernel = fixture.kernel();
    let tx = transfer(fixture.account(0), fixture.account(1).public_key(), AssetId(42), Amount(1));

    assert_eq!(
        Verdict::Rejected(FailureCode::UnknownArtifact),
        kernel.validate_transaction(tx.to_bytes(), Height(2))
    );
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let fixture = ChainFixture::new(4);
    let kernel = fixture.kernel();

    let batch: Vec<Bytes> = (0..32u64)
        .map(|i| {
            let sender = fixture.account(i as usize % 4);
            let amount = if i % 5 == 0 { INITIAL_BALANCE.0 + 1 } else { i };
            transfer(sender, random_public_key(), PRIMARY, Amount(amount)).to_bytes()
        })
        .collect();

    let parallel = kernel.validate_transactions(&batch, Height(2));
    let sequential: Vec<_> = batch
        .iter()
        .map(|bytes| kernel.validate_transaction(bytes.clone(), Height(2)))
        .collect();

    assert_eq!(sequential, parallel);
    assert_eq!(
        7,
        parallel
            .iter()
            .filter(|verdict| verdict.failure() == Some(FailureCode::InsufficientBalance))
            .count()
    );
}
