//! Aggregate cosignature rules.

use std::collections::BTreeSet;

use ledger_kernel_core::{Notification, NotificationType, PublicKey};

use crate::result::{FailureCode, ValidationResult};
use crate::traits::StatelessValidator;

/// Bounds the size of an aggregate and rejects redundant cosigners.
///
/// The aggregate signer counts against `max_cosignatures`.
#[derive(Debug, Clone, Copy)]
pub struct BasicAggregateCosignaturesValidator {
    max_transactions: u32,
    max_cosignatures: u32,
}

impl BasicAggregateCosignaturesValidator {
    pub fn new(max_transactions: u32, max_cosignatures: u32) -> Self {
        Self {
            max_transactions,
            max_cosignatures,
        }
    }
}

impl StatelessValidator for BasicAggregateCosignaturesValidator {
    fn name(&self) -> &'static str {
        "BasicAggregateCosignaturesValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::AggregateCosignatures
    }

    fn validate(&self, notification: &Notification<'_>) -> ValidationResult {
        let Notification::AggregateCosignatures(aggregate) = notification else {
            return ValidationResult::Success;
        };

        if aggregate.transactions.is_empty() {
            return FailureCode::EmptyAggregate.into();
        }

        if aggregate.transactions.len() > self.max_transactions as usize {
            return FailureCode::TooManyTransactions.into();
        }

        if aggregate.cosignatures.len() + 1 > self.max_cosignatures as usize {
            return FailureCode::TooManyCosignatures.into();
        }

        let mut signers = BTreeSet::from([aggregate.signer]);
        for cosignature in aggregate.cosignatures.iter() {
            if !signers.insert(cosignature.signer) {
                return FailureCode::RedundantCosignatures.into();
            }
        }

        ValidationResult::Success
    }
}

/// Requires an exact match between embedded signers and approvers: every
/// embedded signer is the aggregate signer or a cosigner, and every cosigner
/// signs at least one embedded transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictAggregateCosignaturesValidator;

impl StatelessValidator for StrictAggregateCosignaturesValidator {
    fn name(&self) -> &'static str {
        "StrictAggregateCosignaturesValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::AggregateCosignatures
    }

    fn validate(&self, notification: &Notification<'_>) -> ValidationResult {
        let Notification::AggregateCosignatures(aggregate) = notification else {
            return ValidationResult::Success;
        };

        let embedded_signers: BTreeSet<PublicKey> = aggregate
            .transactions
            .iter()
            .map(|transaction| transaction.signer())
            .collect();

        let covered = |signer: &PublicKey| {
            *signer == aggregate.signer || aggregate.cosignatures.contains(signer)
        };
        if !embedded_signers.iter().all(covered) {
            return FailureCode::MissingCosignatures.into();
        }

        if aggregate
            .cosignatures
            .iter()
            .any(|cosignature| !embedded_signers.contains(&cosignature.signer))
        {
            return FailureCode::IneligibleCosigners.into();
        }

        ValidationResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel_core::{
        AggregateBuilder, AggregateCosignaturesNotification, AggregateTransaction, Cosignature,
        EmbeddedTransactionBuilder, EntityType, Keypair, Signature, Transaction,
    };

    fn key(byte: u8) -> PublicKey {
        PublicKey([byte; 32])
    }

    fn build(signer: &Keypair, embedded: &[PublicKey], cosigners: &[PublicKey]) -> Transaction {
        let mut builder = AggregateBuilder::new();
        for embedded_signer in embedded {
            builder = builder.transaction(
                EmbeddedTransactionBuilder::new(*embedded_signer, EntityType::TRANSFER)
                    .body(vec![0u8; 48])
                    .build(),
            );
        }
        for cosigner in cosigners {
            builder = builder.cosignature(Cosignature {
                signer: *cosigner,
                signature: Signature::ZERO,
            });
        }
        builder.sign(signer, &[])
    }

    fn summary(transaction: &Transaction) -> Notification<'_> {
        let aggregate = AggregateTransaction::parse(transaction).unwrap();
        Notification::AggregateCosignatures(AggregateCosignaturesNotification {
            signer: aggregate.signer(),
            transactions: aggregate.transactions(),
            cosignatures: aggregate.cosignatures(),
        })
    }

    fn failure(code: FailureCode) -> ValidationResult {
        ValidationResult::Failure(code)
    }

    #[test]
    fn test_basic_bounds() {
        let signer = Keypair::generate();
        let validator = BasicAggregateCosignaturesValidator::new(2, 3);

        let empty = build(&signer, &[], &[]);
        assert_eq!(failure(FailureCode::EmptyAggregate), validator.validate(&summary(&empty)));

        let at_limit = build(&signer, &[key(1), key(2)], &[key(1), key(2)]);
        assert_eq!(ValidationResult::Success, validator.validate(&summary(&at_limit)));

        let too_many = build(&signer, &[key(1), key(2), key(3)], &[]);
        assert_eq!(
            failure(FailureCode::TooManyTransactions),
            validator.validate(&summary(&too_many))
        );

        let too_many_cosigners = build(&signer, &[key(1)], &[key(1), key(2), key(3)]);
        assert_eq!(
            failure(FailureCode::TooManyCosignatures),
            validator.validate(&summary(&too_many_cosigners))
        );
    }

    #[test]
    fn test_basic_redundant_cosigners() {
        let signer = Keypair::generate();
        let validator = BasicAggregateCosignaturesValidator::new(10, 10);

        let duplicate = build(&signer, &[key(1)], &[key(1), key(1)]);
        assert_eq!(
            failure(FailureCode::RedundantCosignatures),
            validator.validate(&summary(&duplicate))
        );

        let self_cosigned = build(&signer, &[key(1)], &[signer.public_key()]);
        assert_eq!(
            failure(FailureCode::RedundantCosignatures),
            validator.validate(&summary(&self_cosigned))
        );
    }

    #[test]
    fn test_strict_requires_matching_signers() {
        let signer = Keypair::generate();
        let validator = StrictAggregateCosignaturesValidator;

        let own = build(&signer, &[signer.public_key(), key(1)], &[key(1)]);
        assert_eq!(ValidationResult::Success, validator.validate(&summary(&own)));

        let missing = build(&signer, &[key(1), key(2)], &[key(1)]);
        assert_eq!(
            failure(FailureCode::MissingCosignatures),
            validator.validate(&summary(&missing))
        );

        let extra = build(&signer, &[key(1)], &[key(1), key(9)]);
        assert_eq!(
            failure(FailureCode::IneligibleCosigners),
            validator.validate(&summary(&extra))
        );
    }
}
