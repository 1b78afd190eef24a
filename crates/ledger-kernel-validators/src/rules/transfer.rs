//! Balance sufficiency and credit bounds.

use ledger_kernel_core::{Amount, AssetId, Notification, NotificationType, PublicKey};

use crate::context::ValidatorContext;
use crate::result::{FailureCode, ValidationResult};
use crate::traits::StatefulValidator;

/// The sender must hold at least the transferred amount of the asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceTransferValidator;

impl StatefulValidator for BalanceTransferValidator {
    fn name(&self) -> &'static str {
        "BalanceTransferValidator"
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

        let available = context
            .cache()
            .accounts()
            .get(&transfer.sender)
            .map(|account| account.balances.get(transfer.asset_id))
            .unwrap_or_default();

        if available < transfer.amount {
            return FailureCode::InsufficientBalance.into();
        }
        ValidationResult::Success
    }
}

/// Whether crediting `amount` of `asset_id` to `account` stays representable.
pub(crate) fn credit_fits(
    context: &ValidatorContext<'_>,
    account: &PublicKey,
    asset_id: AssetId,
    amount: Amount,
) -> bool {
    let current = context
        .cache()
        .accounts()
        .get(account)
        .map(|account| account.balances.get(asset_id))
        .unwrap_or_default();
    current.0.checked_add(amount.0).is_some()
}

/// The recipient's balance must not overflow when credited.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceCreditValidator;

impl StatefulValidator for BalanceCreditValidator {
    fn name(&self) -> &'static str {
        "BalanceCreditValidator"
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
        // A self transfer debits before it credits.
        if transfer.sender == transfer.recipient {
            return ValidationResult::Success;
        }

        if !credit_fits(context, &transfer.recipient, transfer.asset_id, transfer.amount) {
            return FailureCode::BalanceOverflow.into();
        }
        ValidationResult::Success
    }
}
