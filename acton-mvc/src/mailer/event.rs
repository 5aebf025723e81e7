use crate::events::{Cancellable, Hook};

use super::MailMessage;

/// Payload of the `beforeSend` and `afterSend` hooks
///
/// `beforeSend` observers may edit `message` before it is delivered, or
/// clear `is_valid` to skip delivery. `is_successful` is only meaningful in
/// `afterSend`.
#[derive(Debug, Clone)]
pub struct MailEvent {
    /// Message being sent
    pub message: MailMessage,
    /// Whether sending should go ahead
    pub is_valid: bool,
    /// Delivery outcome
    pub is_successful: bool,
}

impl MailEvent {
    /// Event for a message about to be sent
    #[must_use]
    pub const fn new(message: MailMessage) -> Self {
        Self {
            message,
            is_valid: true,
            is_successful: false,
        }
    }
}

impl Cancellable for MailEvent {
    fn is_valid(&self) -> bool {
        self.is_valid
    }

    fn cancel(&mut self) {
        self.is_valid = false;
    }
}

/// Hooks exposed by a [`Mailer`](super::Mailer)
#[derive(Debug, Clone)]
pub struct MailerHooks {
    /// Before delivery; cancellable
    pub before_send: Hook<MailEvent>,
    /// After delivery, with the outcome
    pub after_send: Hook<MailEvent>,
}

impl Default for MailerHooks {
    fn default() -> Self {
        Self {
            before_send: Hook::new("beforeSend"),
            after_send: Hook::new("afterSend"),
        }
    }
}
