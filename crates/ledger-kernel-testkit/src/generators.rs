//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ledger_kernel_core::{
    Amount, ArtifactDefinition, ArtifactDuration, ArtifactFlags, ArtifactProperties, AssetId,
    Height, Keypair, PublicKey, Transaction,
};
use ledger_kernel_plugins::TransferBody;

use crate::mocks::MockAggregateBuilder;

/// Generate a keypair from a random seed.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate arbitrary key bytes. Not necessarily a valid curve point.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    any::<[u8; 32]>().prop_map(PublicKey)
}

pub fn height() -> impl Strategy<Value = Height> {
    any::<u64>().prop_map(Height)
}

/// A finite, non-zero duration that cannot overflow from `creation`.
pub fn finite_duration(creation: Height) -> impl Strategy<Value = ArtifactDuration> {
    let max = (u64::MAX - 1).saturating_sub(creation.0).max(1);
    (1..=max).prop_map(ArtifactDuration)
}

pub fn artifact_flags() -> impl Strategy<Value = ArtifactFlags> {
    prop_oneof![
        Just(ArtifactFlags::NONE),
        Just(ArtifactFlags::SUPPLY_MUTABLE),
        Just(ArtifactFlags::TRANSFERABLE),
        Just(ArtifactFlags::ALL),
    ]
}

/// A finite artifact definition whose expiry height is representable.
pub fn finite_artifact() -> impl Strategy<Value = ArtifactDefinition> {
    (0u64..u64::MAX / 2, public_key(), artifact_flags(), 0u8..=6)
        .prop_flat_map(|(creation, owner, flags, divisibility)| {
            let creation = Height(creation);
            finite_duration(creation).prop_map(move |duration| {
                ArtifactDefinition::new(
                    creation,
                    owner,
                    ArtifactProperties::new(flags, divisibility, duration),
                )
            })
        })
}

/// An artifact with one of the eternal durations.
pub fn eternal_artifact() -> impl Strategy<Value = ArtifactDefinition> {
    (
        height(),
        public_key(),
        prop_oneof![Just(ArtifactDuration::ETERNAL), Just(ArtifactDuration(u64::MAX))],
    )
        .prop_map(|(creation, owner, duration)| {
            ArtifactDefinition::new(
                creation,
                owner,
                ArtifactProperties::new(ArtifactFlags::NONE, 0, duration),
            )
        })
}

pub fn transfer_body() -> impl Strategy<Value = TransferBody> {
    (public_key(), 0u64..8, any::<u64>()).prop_map(|(recipient, asset_id, amount)| TransferBody {
        recipient,
        asset_id: AssetId(asset_id),
        amount: Amount(amount),
    })
}

/// Shape of a mock aggregate.
#[derive(Debug, Clone)]
pub struct AggregateParams {
    pub seed: [u8; 32],
    pub embedded: usize,
    pub cosignatures: usize,
}

impl Arbitrary for AggregateParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<[u8; 32]>(), 0usize..=12, 0usize..=12)
            .prop_map(|(seed, embedded, cosignatures)| AggregateParams {
                seed,
                embedded,
                cosignatures,
            })
            .boxed()
    }
}

/// Build a mock aggregate from parameters.
pub fn aggregate_from_params(params: &AggregateParams) -> Transaction {
    MockAggregateBuilder::new(Keypair::from_seed(&params.seed))
        .embedded(params.embedded)
        .cosignatures(params.cosignatures)
        .build()
}
