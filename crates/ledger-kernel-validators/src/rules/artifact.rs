//! Artifact definition and usage rules.

use ledger_kernel_core::{ArtifactDuration, AssetId, Notification, NotificationType};

use crate::context::ValidatorContext;
use crate::result::{FailureCode, ValidationResult};
use crate::rules::transfer::credit_fits;
use crate::traits::{StatefulValidator, StatelessValidator};

/// Finite durations may not exceed `max_duration`. Eternal durations always pass.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactDurationValidator {
    max_duration: ArtifactDuration,
}

impl ArtifactDurationValidator {
    pub fn new(max_duration: ArtifactDuration) -> Self {
        Self { max_duration }
    }
}

impl StatelessValidator for ArtifactDurationValidator {
    fn name(&self) -> &'static str {
        "ArtifactDurationValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::ArtifactDefinition
    }

    fn validate(&self, notification: &Notification<'_>) -> ValidationResult {
        let Notification::ArtifactDefinition(definition) = notification else {
            return ValidationResult::Success;
        };

        let duration = definition.properties.duration;
        if !duration.is_eternal() && duration > self.max_duration {
            return FailureCode::InvalidArtifactDuration.into();
        }
        ValidationResult::Success
    }
}

/// An artifact that is still active may only be redefined by its owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactOwnershipValidator;

impl StatefulValidator for ArtifactOwnershipValidator {
    fn name(&self) -> &'static str {
        "ArtifactOwnershipValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::ArtifactDefinition
    }

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let Notification::ArtifactDefinition(definition) = notification else {
            return ValidationResult::Success;
        };

        match context.cache().artifacts().get(&definition.artifact_id) {
            Some(existing)
                if existing.is_active(context.height()) && existing.owner != definition.owner =>
            {
                FailureCode::ArtifactOwnerConflict.into()
            }
            _ => ValidationResult::Success,
        }
    }
}

/// Crediting the supply to the owner must not overflow the owner's balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactSupplyValidator;

impl StatefulValidator for ArtifactSupplyValidator {
    fn name(&self) -> &'static str {
        "ArtifactSupplyValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::ArtifactDefinition
    }

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let Notification::ArtifactDefinition(definition) = notification else {
            return ValidationResult::Success;
        };

        let asset_id = definition.artifact_id.as_asset();
        if !credit_fits(context, &definition.owner, asset_id, definition.supply) {
            return FailureCode::BalanceOverflow.into();
        }
        ValidationResult::Success
    }
}

/// Transfers of anything but the primary asset need a defined artifact that
/// is active and not expired at the current height.
#[derive(Debug, Clone, Copy)]
pub struct ActiveArtifactValidator {
    primary_asset_id: AssetId,
}

impl ActiveArtifactValidator {
    pub fn new(primary_asset_id: AssetId) -> Self {
        Self { primary_asset_id }
    }
}

impl StatefulValidator for ActiveArtifactValidator {
    fn name(&self) -> &'static str {
        "ActiveArtifactValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::BalanceTransfer
    }

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let Notification::BalanceTransfer(transfer) = notification else {
            return ValidationResult::Success;
        };
        if transfer.asset_id == self.primary_asset_id {
            return ValidationResult::Success;
        }

        let artifacts = context.cache().artifacts();
        let Some(definition) = artifacts.get(&transfer.asset_id.as_artifact()) else {
            return FailureCode::UnknownArtifact.into();
        };

        let height = context.height();
        if !definition.is_active(height) || definition.is_expired(height) {
            return FailureCode::ArtifactExpired.into();
        }
        ValidationResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel_cache::{AccountState, LedgerCache};
    use ledger_kernel_core::{
        Amount, ArtifactDefinition, ArtifactDefinitionNotification, ArtifactFlags, ArtifactId,
        ArtifactProperties, BalanceTransferNotification, Height, PublicKey,
    };

    const OWNER: PublicKey = PublicKey([1; 32]);

    fn properties(duration: u64) -> ArtifactProperties {
        ArtifactProperties::new(ArtifactFlags::TRANSFERABLE, 0, ArtifactDuration(duration))
    }

    fn definition(owner: PublicKey, duration: u64) -> Notification<'static> {
        Notification::ArtifactDefinition(ArtifactDefinitionNotification {
            owner,
            artifact_id: ArtifactId(9),
            properties: properties(duration),
            supply: Amount(1000),
        })
    }

    fn transfer(asset_id: AssetId) -> Notification<'static> {
        Notification::BalanceTransfer(BalanceTransferNotification {
            sender: OWNER,
            recipient: PublicKey([2; 32]),
            asset_id,
            amount: Amount(1),
        })
    }

    /// Artifact 9 created at height 345 with duration 57 (expires at 402).
    fn cache() -> LedgerCache {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        delta.artifacts_mut().insert(
            ArtifactId(9),
            ArtifactDefinition::new(Height(345), OWNER, properties(57)),
        );
        cache.commit(delta, Height(1)).unwrap();
        cache
    }

    #[test]
    fn test_duration_bounds() {
        let validator = ArtifactDurationValidator::new(ArtifactDuration(100));

        assert_eq!(ValidationResult::Success, validator.validate(&definition(OWNER, 0)));
        assert_eq!(ValidationResult::Success, validator.validate(&definition(OWNER, 100)));
        assert_eq!(
            ValidationResult::Failure(FailureCode::InvalidArtifactDuration),
            validator.validate(&definition(OWNER, 101))
        );
        assert_eq!(
            ValidationResult::Failure(FailureCode::InvalidArtifactDuration),
            validator.validate(&definition(OWNER, u64::MAX - 1))
        );
    }

    #[test]
    fn test_max_duration_is_eternal() {
        let validator = ArtifactDurationValidator::new(ArtifactDuration(100));
        assert_eq!(ValidationResult::Success, validator.validate(&definition(OWNER, u64::MAX)));
    }

    #[test]
    fn test_ownership() {
        let cache = cache();
        let view = cache.create_view();
        let validator = ArtifactOwnershipValidator;
        let other = PublicKey([3; 32]);

        let active = ValidatorContext::new(Height(400), 1, view.to_read_only());
        assert_eq!(
            ValidationResult::Success,
            validator.validate(&definition(OWNER, 10), &active)
        );
        assert_eq!(
            ValidationResult::Failure(FailureCode::ArtifactOwnerConflict),
            validator.validate(&definition(other, 10), &active)
        );

        let expired = ValidatorContext::new(Height(402), 1, view.to_read_only());
        assert_eq!(
            ValidationResult::Success,
            validator.validate(&definition(other, 10), &expired)
        );
    }

    #[test]
    fn test_active_artifact() {
        let cache = cache();
        let view = cache.create_view();
        let validator = ActiveArtifactValidator::new(AssetId(0));
        let read_only = view.to_read_only();
        let at = |height: u64| ValidatorContext::new(Height(height), 1, read_only);

        assert_eq!(
            ValidationResult::Success,
            validator.validate(&transfer(AssetId(0)), &at(1000))
        );
        assert_eq!(
            ValidationResult::Success,
            validator.validate(&transfer(AssetId(9)), &at(401))
        );
        assert_eq!(
            ValidationResult::Failure(FailureCode::ArtifactExpired),
            validator.validate(&transfer(AssetId(9)), &at(402))
        );
        assert_eq!(
            ValidationResult::Failure(FailureCode::UnknownArtifact),
            validator.validate(&transfer(AssetId(8)), &at(401))
        );
    }

    #[test]
    fn test_supply_credit_bound() {
        let cache = LedgerCache::new();
        let mut delta = cache.create_delta();
        let mut account = AccountState::new(OWNER, Height(1));
        account
            .balances
            .credit(ArtifactId(9).as_asset(), Amount(u64::MAX - 1000))
            .unwrap();
        delta.accounts_mut().insert(OWNER, account);
        cache.commit(delta, Height(1)).unwrap();

        let view = cache.create_view();
        let context = ValidatorContext::new(Height(2), 1, view.to_read_only());
        let validator = ArtifactSupplyValidator;

        // `definition` carries a supply of 1000.
        assert_eq!(
            ValidationResult::Success,
            validator.validate(&definition(OWNER, 10), &context)
        );
        let mut over = definition(OWNER, 10);
        if let Notification::ArtifactDefinition(inner) = &mut over {
            inner.supply = Amount(1001);
        }
        assert_eq!(
            ValidationResult::Failure(FailureCode::BalanceOverflow),
            validator.validate(&over, &context)
        );
        assert_eq!(
            ValidationResult::Success,
            validator.validate(&definition(PublicKey([5; 32]), 10), &context)
        );
    }
}
