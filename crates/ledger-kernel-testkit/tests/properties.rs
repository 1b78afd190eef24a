//! Property tests over mock aggregates and artifact lifecycles.

use proptest::prelude::*;

use ledger_kernel_core::{
    EntityType, Height, Keypair, Notification, NotificationCounter, NotificationType,
    AGGREGATE_HEADER_SIZE, COSIGNATURE_SIZE, EMBEDDED_HEADER_SIZE, KEY_SIZE,
    VERIFIABLE_HEADER_SIZE,
};
use ledger_kernel_plugins::{FixedBody, TransactionPlugin};
use ledger_kernel_testkit::generators::{eternal_artifact, finite_artifact};
use ledger_kernel_testkit::{
    aggregate_from_params, mock_aggregate_plugin, AggregateParams, MockAggregateBuilder, MockBody,
    NOTIFICATIONS_PER_EMBEDDED_MOCK,
};

const EMBEDDED_MOCK_SIZE: usize = EMBEDDED_HEADER_SIZE + MockBody::SIZE;

proptest! {
    #[test]
    fn publish_count_matches_structure(params: AggregateParams) {
        let tx = aggregate_from_params(&params);
        let plugin = mock_aggregate_plugin().unwrap();

        let mut sink = Vec::new();
        plugin.publish(&tx, &mut sink).unwrap();

        let expected =
            1 + params.cosignatures + NOTIFICATIONS_PER_EMBEDDED_MOCK * params.embedded;
        prop_assert_eq!(expected, sink.len());
        prop_assert_eq!(NotificationType::AggregateCosignatures, sink[0].notification_type());
    }

    #[test]
    fn publish_counts_by_type(params: AggregateParams) {
        let tx = aggregate_from_params(&params);
        let mut counter = NotificationCounter::new();
        mock_aggregate_plugin().unwrap().publish(&tx, &mut counter).unwrap();

        prop_assert_eq!(params.cosignatures, counter.count(NotificationType::Signature));
        prop_assert_eq!(
            params.embedded,
            counter.count(NotificationType::AggregateEmbeddedTransaction)
        );
        prop_assert_eq!(2 * params.embedded, counter.count(NotificationType::AccountPublicKey));
    }

    #[test]
    fn real_size_matches_layout(params: AggregateParams) {
        let tx = aggregate_from_params(&params);
        let expected = AGGREGATE_HEADER_SIZE
            + params.embedded * EMBEDDED_MOCK_SIZE
            + params.cosignatures * COSIGNATURE_SIZE;

        let plugin = mock_aggregate_plugin().unwrap();
        prop_assert_eq!(Some(expected as u64), plugin.calculate_real_size(&tx));
        prop_assert_eq!(expected, tx.as_bytes().len());
    }

    #[test]
    fn unregistered_embedded_type_has_no_size(params: AggregateParams) {
        let tx = MockAggregateBuilder::new(Keypair::from_seed(&params.seed))
            .embedded(params.embedded)
            .unregistered(EntityType(0x7e7e))
            .cosignatures(params.cosignatures)
            .build();

        let plugin = mock_aggregate_plugin().unwrap();
        prop_assert_eq!(None, plugin.calculate_real_size(&tx));

        let mut sink = Vec::new();
        prop_assert!(plugin.publish(&tx, &mut sink).is_err());
        prop_assert!(sink.is_empty());
    }

    #[test]
    fn data_buffer_excludes_cosignatures(params: AggregateParams) {
        let tx = aggregate_from_params(&params);
        let data = mock_aggregate_plugin().unwrap().data_buffer(&tx).unwrap();

        let expected_len =
            AGGREGATE_HEADER_SIZE - VERIFIABLE_HEADER_SIZE + params.embedded * EMBEDDED_MOCK_SIZE;
        prop_assert_eq!(expected_len, data.len());
        prop_assert_eq!(
            &tx.as_bytes()[VERIFIABLE_HEADER_SIZE..VERIFIABLE_HEADER_SIZE + expected_len],
            data
        );
    }

    #[test]
    fn supplementary_buffers_are_cosigner_keys(params: AggregateParams) {
        let builder = MockAggregateBuilder::new(Keypair::from_seed(&params.seed))
            .embedded(params.embedded)
            .cosignatures(params.cosignatures);
        let cosigners = builder.cosigner_keys().to_vec();
        let tx = builder.build();

        let buffers = mock_aggregate_plugin().unwrap().supplementary_buffers(&tx).unwrap();
        prop_assert_eq!(params.cosignatures, buffers.len());
        for (buffer, cosigner) in buffers.iter().zip(&cosigners) {
            prop_assert_eq!(KEY_SIZE, buffer.len());
            prop_assert_eq!(cosigner.as_bytes().as_slice(), *buffer);
        }
    }

    #[test]
    fn publish_is_deterministic(params: AggregateParams) {
        let tx = aggregate_from_params(&params);
        let plugin = mock_aggregate_plugin().unwrap();

        let mut first = Vec::new();
        let mut second = Vec::new();
        plugin.publish(&tx, &mut first).unwrap();
        plugin.publish(&tx, &mut second).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn finite_artifact_window(artifact in finite_artifact(), offset in any::<u64>()) {
        let creation = artifact.height.0;
        let duration = artifact.properties.duration.0;

        let inside = Height(creation + offset % duration);
        prop_assert!(artifact.is_active(inside));
        prop_assert!(!artifact.is_expired(inside));

        let expiry = creation + duration;
        let outside = Height(expiry.saturating_add(offset % 1024));
        prop_assert!(!artifact.is_active(outside));
        prop_assert!(artifact.is_expired(outside));
    }

    #[test]
    fn eternal_artifact_never_expires(artifact in eternal_artifact(), height in any::<u64>()) {
        for height in [Height(0), Height(height), Height(u64::MAX)] {
            prop_assert!(artifact.is_active(height));
            prop_assert!(!artifact.is_expired(height));
        }
    }
}

#[test]
fn test_empty_aggregate_publishes_summary_only() {
    let tx = MockAggregateBuilder::new(Keypair::from_seed(&[9; 32])).build();

    let mut sink = Vec::new();
    mock_aggregate_plugin().unwrap().publish(&tx, &mut sink).unwrap();

    assert_eq!(1, sink.len());
    let Notification::AggregateCosignatures(summary) = sink[0] else {
        panic!("unexpected notification: {:?}", sink[0]);
    };
    assert_eq!(0, summary.transactions.len());
    assert_eq!(0, summary.cosignatures.len());
    assert!(summary.transactions.region().is_none());
    assert!(summary.cosignatures.region().is_none());
}
