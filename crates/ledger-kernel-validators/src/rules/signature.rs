//! Signature verification through a pluggable verifier.

use std::sync::Arc;

use ledger_kernel_core::{Notification, NotificationType};

use crate::result::{FailureCode, ValidationResult};
use crate::traits::{SignatureVerifier, StatelessValidator};

pub struct SignatureValidator {
    verifier: Arc<dyn SignatureVerifier>,
}

impl SignatureValidator {
    pub fn new(verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self { verifier }
    }
}

impl StatelessValidator for SignatureValidator {
    fn name(&self) -> &'static str {
        "SignatureValidator"
    }

    fn notification_type(&self) -> NotificationType {
        NotificationType::Signature
    }

    fn validate(&self, notification: &Notification<'_>) -> ValidationResult {
        let Notification::Signature(signature) = notification else {
            return ValidationResult::Success;
        };

        if self
            .verifier
            .verify(&signature.signer, signature.data, &signature.signature)
        {
            ValidationResult::Success
        } else {
            FailureCode::InvalidSignature.into()
        }
    }
}
