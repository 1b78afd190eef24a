//! Validator capabilities.

use ledger_kernel_core::{Notification, NotificationType, PublicKey, Signature};

use crate::context::ValidatorContext;
use crate::result::ValidationResult;

// ─────────────────────────────────────────────────────────────────────────────
// Validators
// ─────────────────────────────────────────────────────────────────────────────

/// A rule that depends only on the notification and static configuration.
pub trait StatelessValidator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// The notification kind this validator is invoked for.
    fn notification_type(&self) -> NotificationType;

    fn validate(&self, notification: &Notification<'_>) -> ValidationResult;
}

/// A rule that may also consult the cache at the target height.
pub trait StatefulValidator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// The notification kind this validator is invoked for.
    fn notification_type(&self) -> NotificationType;

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult;
}

// ─────────────────────────────────────────────────────────────────────────────
// Signature verification
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque signature check.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, signer: &PublicKey, data: &[u8], signature: &Signature) -> bool;
}

/// Ed25519 verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, signer: &PublicKey, data: &[u8], signature: &Signature) -> bool {
        signer.verify(data, signature).is_ok()
    }
}
