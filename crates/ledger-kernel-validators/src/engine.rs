//! Ordered, short-circuiting validator dispatch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ledger_kernel_core::{Notification, NotificationSink, NotificationType};

use crate::context::ValidatorContext;
use crate::result::ValidationResult;
use crate::traits::{StatefulValidator, StatelessValidator};

#[derive(Clone)]
enum Registered {
    Stateless(Arc<dyn StatelessValidator>),
    Stateful(Arc<dyn StatefulValidator>),
}

impl Registered {
    fn name(&self) -> &'static str {
        match self {
            Self::Stateless(validator) => validator.name(),
            Self::Stateful(validator) => validator.name(),
        }
    }

    fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        match self {
            Self::Stateless(validator) => validator.validate(notification),
            Self::Stateful(validator) => validator.validate(notification, context),
        }
    }
}

/// Validators grouped by notification kind, in registration order.
///
/// Assembled once by [`ValidatorEngineBuilder`] and shared immutably.
#[derive(Clone, Default)]
pub struct ValidatorEngine {
    validators: BTreeMap<NotificationType, Vec<Registered>>,
}

impl ValidatorEngine {
    pub fn builder() -> ValidatorEngineBuilder {
        ValidatorEngineBuilder::default()
    }

    /// Total number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Names of the validators run for `notification_type`, in order.
    pub fn names(&self, notification_type: NotificationType) -> Vec<&'static str> {
        self.validators
            .get(&notification_type)
            .map(|validators| validators.iter().map(Registered::name).collect())
            .unwrap_or_default()
    }

    /// Run every validator registered for the notification's kind.
    ///
    /// Stops at the first failure; a neutral result does not stop the chain.
    pub fn validate(
        &self,
        notification: &Notification<'_>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let notification_type = notification.notification_type();
        let Some(validators) = self.validators.get(&notification_type) else {
            return ValidationResult::Success;
        };

        let mut result = ValidationResult::Success;
        for validator in validators {
            let outcome = validator.validate(notification, context);
            if let ValidationResult::Failure(code) = outcome {
                tracing::debug!(
                    validator = validator.name(),
                    notification = %notification_type,
                    height = %context.height(),
                    %code,
                    "notification rejected"
                );
                return outcome;
            }
            result = result.aggregate(outcome);
        }
        result
    }

    /// Validate a notification stream, stopping at the first failure.
    pub fn validate_all<'a>(
        &self,
        notifications: impl IntoIterator<Item = Notification<'a>>,
        context: &ValidatorContext<'_>,
    ) -> ValidationResult {
        let mut sink = ValidatingSink::new(self, *context);
        for notification in notifications {
            sink.notify(notification);
            if sink.result().is_failure() {
                break;
            }
        }
        sink.result()
    }
}

impl fmt::Debug for ValidatorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: BTreeMap<_, _> = self
            .validators
            .keys()
            .map(|notification_type| (notification_type, self.names(*notification_type)))
            .collect();
        f.debug_struct("ValidatorEngine")
            .field("validators", &names)
            .finish()
    }
}

/// Builder for [`ValidatorEngine`].
#[derive(Default)]
pub struct ValidatorEngineBuilder {
    validators: BTreeMap<NotificationType, Vec<Registered>>,
}

impl ValidatorEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stateless(self, validator: impl StatelessValidator + 'static) -> Self {
        let notification_type = validator.notification_type();
        self.register(notification_type, Registered::Stateless(Arc::new(validator)))
    }

    pub fn stateful(self, validator: impl StatefulValidator + 'static) -> Self {
        let notification_type = validator.notification_type();
        self.register(notification_type, Registered::Stateful(Arc::new(validator)))
    }

    fn register(mut self, notification_type: NotificationType, validator: Registered) -> Self {
        self.validators
            .entry(notification_type)
            .or_default()
            .push(validator);
        self
    }

    pub fn build(self) -> Arc<ValidatorEngine> {
        Arc::new(ValidatorEngine {
            validators: self.validators,
        })
    }
}

/// A sink that validates notifications as they are published.
///
/// Once a failure is recorded, later notifications are ignored.
#[derive(Debug)]
pub struct ValidatingSink<'e, 'c> {
    engine: &'e ValidatorEngine,
    context: ValidatorContext<'c>,
    result: ValidationResult,
}

impl<'e, 'c> ValidatingSink<'e, 'c> {
    pub fn new(engine: &'e ValidatorEngine, context: ValidatorContext<'c>) -> Self {
        Self {
            engine,
            context,
            result: ValidationResult::Success,
        }
    }

    /// Aggregate result of everything seen so far.
    pub fn result(&self) -> ValidationResult {
        self.result
    }
}

impl<'a> NotificationSink<'a> for ValidatingSink<'_, '_> {
    fn notify(&mut self, notification: Notification<'a>) {
        if self.result.is_failure() {
            return;
        }
        let outcome = self.engine.validate(&notification, &self.context);
        self.result = self.result.aggregate(outcome);
    }
}
