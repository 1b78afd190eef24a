//! Property tests for aggregate decomposition.

use ledger_kernel_core::{
    AggregateBuilder, Amount, AssetId, EmbeddedTransactionBuilder, EntityType, Keypair,
    Notification, PublicKey, Transaction, AGGREGATE_HEADER_SIZE, COSIGNATURE_SIZE,
    EMBEDDED_HEADER_SIZE, KEY_SIZE, VERIFIABLE_HEADER_SIZE,
};
use ledger_kernel_plugins::{default_registry, FixedBody, TransferBody};
use proptest::prelude::*;

const TRANSFER_NOTIFICATIONS: usize = 3;
const TRANSFER_SIZE: usize = EMBEDDED_HEADER_SIZE + TransferBody::SIZE;

fn aggregate(embedded: usize, cosigners: &[Keypair]) -> Transaction {
    let mut builder = AggregateBuilder::new();
    for i in 0..embedded {
        let body = TransferBody {
            recipient: PublicKey([i as u8; 32]),
            asset_id: AssetId(0),
            amount: Amount(i as u64),
        };
        builder = builder.transaction(
            EmbeddedTransactionBuilder::new(PublicKey([0x10 + i as u8; 32]), EntityType::TRANSFER)
                .body(body.to_bytes())
                .build(),
        );
    }
    let refs: Vec<&Keypair> = cosigners.iter().collect();
    builder.sign(&Keypair::from_seed(&[0xaa; 32]), &refs)
}

fn cosigners(count: usize) -> Vec<Keypair> {
    (0..count).map(|i| Keypair::from_seed(&[i as u8 + 1; 32])).collect()
}

proptest! {
    #[test]
    fn prop_notification_count(k in 0usize..6, m in 0usize..5) {
        let registry = default_registry().unwrap();
        let plugin = registry.resolve(EntityType::AGGREGATE).unwrap();
        let tx = aggregate(k, &cosigners(m));

        let mut sink = Vec::new();
        plugin.publish(&tx, &mut sink).unwrap();

        prop_assert_eq!(1 + m + (TRANSFER_NOTIFICATIONS + 1) * k, sink.len());
        prop_assert!(matches!(sink[0], Notification::AggregateCosignatures(_)), "summary must come first");
    }

    #[test]
    fn prop_real_size_and_buffers(k in 0usize..6, m in 0usize..5) {
        let registry = default_registry().unwrap();
        let plugin = registry.resolve(EntityType::AGGREGATE).unwrap();
        let tx = aggregate(k, &cosigners(m));

        let expected = AGGREGATE_HEADER_SIZE + k * TRANSFER_SIZE + m * COSIGNATURE_SIZE;
        prop_assert_eq!(Some(expected as u64), plugin.calculate_real_size(&tx));

        let data = plugin.data_buffer(&tx).unwrap();
        prop_assert_eq!(
            &tx.as_bytes()[VERIFIABLE_HEADER_SIZE..AGGREGATE_HEADER_SIZE + k * TRANSFER_SIZE],
            data
        );

        let supplementary = plugin.supplementary_buffers(&tx).unwrap();
        prop_assert_eq!(m, supplementary.len());
        prop_assert!(supplementary.iter().all(|buffer| buffer.len() == KEY_SIZE));
    }
}

#[test]
fn test_cosigner_signatures_verify_against_data_buffer() {
    let registry = default_registry().unwrap();
    let plugin = registry.resolve(EntityType::AGGREGATE).unwrap();
    let tx = aggregate(2, &cosigners(2));

    let mut sink = Vec::new();
    plugin.publish(&tx, &mut sink).unwrap();

    for notification in &sink {
        if let Notification::Signature(signature) = notification {
            signature
                .signer
                .verify(signature.data, &signature.signature)
                .unwrap();
        }
    }
}
