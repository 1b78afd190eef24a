//! Block producer eligibility.

use ledger_kernel_core::{Amount, AssetId, Importance, Notification, NotificationType};

use crate::context::ValidatorContext;
use crate::result::{FailureCode, ValidationResult};
use crate::traits::StatefulValidator;

/// Only accounts with a currently effective, nonzero importance and at least
/// `min_balance` of the primary asset may sign blocks.
#[derive(Debug, Clone, Copy)]
pub struct EligibleHarvesterValidator {
    min_balance: Amount,
    primary_asset_id: AssetId,
}

impl EligibleHarvesterValidator {
    pub fn new(min_balance: Amount, primary_asset_id: AssetId) -> Self {
        Self {
            min_balance,
            primary_asset_id,
        }
    }
}

impl StatefulValidator for EligibleHarvesterValidator {
    fn name(&self) -> &'static str {
        "EligibleHarvesterValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::Block
    }

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let Notification::Block(block) = notification else {
            return ValidationResult::Success;
        };

        let accounts = context.cache().accounts();
        let Some(account) = accounts.get(&block.signer) else {
            return FailureCode::HarvesterIneligible.into();
        };

        let importance = account.importance;
        if importance.height != context.importance_height() || importance.importance == Importance(0)
        {
            return FailureCode::HarvesterIneligible.into();
        }

        if account.balances.get(self.primary_asset_id) < self.min_balance {
            return FailureCode::HarvesterIneligible.into();
        }

        ValidationResult::Success
    }
}
