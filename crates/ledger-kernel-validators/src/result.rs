//! Validation verdicts.

use thiserror::Error;

/// Why a notification was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FailureCode {
    /// Block signer is unknown, has no current importance, or too little stake.
    #[error("harvester is not eligible to produce blocks")]
    HarvesterIneligible,

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("aggregate contains no transactions")]
    EmptyAggregate,

    #[error("aggregate contains too many transactions")]
    TooManyTransactions,

    #[error("aggregate contains too many cosignatures")]
    TooManyCosignatures,

    /// A cosigner appears twice, or the aggregate signer also cosigned.
    #[error("aggregate has redundant cosignatures")]
    RedundantCosignatures,

    /// An embedded transaction's signer did not approve the aggregate.
    #[error("aggregate is missing cosignatures")]
    MissingCosignatures,

    /// A cosigner signs none of the embedded transactions.
    #[error("aggregate has ineligible cosigners")]
    IneligibleCosigners,

    #[error("artifact duration is out of range")]
    InvalidArtifactDuration,

    #[error("artifact is owned by another account")]
    ArtifactOwnerConflict,

    #[error("artifact is unknown")]
    UnknownArtifact,

    #[error("artifact has expired")]
    ArtifactExpired,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("balance would overflow")]
    BalanceOverflow,
}

/// Outcome of validating one notification or a stream of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidationResult {
    #[default]
    Success,
    /// Nothing wrong, but nothing to accept either.
    Neutral,
    Failure(FailureCode),
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn failure(&self) -> Option<FailureCode> {
        match self {
            Self::Failure(code) => Some(*code),
            _ => None,
        }
    }

    /// Combine two results: `Failure` dominates `Neutral`, which dominates
    /// `Success`. Between two failures the first one is kept.
    pub fn aggregate(self, other: Self) -> Self {
        match (self, other) {
            (Self::Failure(_), _) => self,
            (_, Self::Failure(_)) => other,
            (Self::Neutral, _) | (_, Self::Neutral) => Self::Neutral,
            _ => Self::Success,
        }
    }
}

impl From<FailureCode> for ValidationResult {
    fn from(code: FailureCode) -> Self {
        Self::Failure(code)
    }
}
