//! Concrete validation rules.

pub mod aggregate;
pub mod artifact;
pub mod harvester;
pub mod signature;
pub mod transfer;

pub use aggregate::{BasicAggregateCosignaturesValidator, StrictAggregateCosignaturesValidator};
pub use artifact::{
    ActiveArtifactValidator, ArtifactDurationValidator, ArtifactOwnershipValidator,
    ArtifactSupplyValidator,
};
pub use harvester::EligibleHarvesterValidator;
pub use signature::SignatureValidator;
pub use transfer::{BalanceCreditValidator, BalanceTransferValidator};
