//! Mail transports
//!
//! A transport delivers one message. The [`Mailer`](super::Mailer) owns the
//! pipeline around it: hooks, logging and the file-transport debug mode.

mod console;
mod smtp;

pub use console::ConsoleTransport;
pub use smtp::{SmtpConfig, SmtpTransport};

use async_trait::async_trait;

use super::{MailError, MailMessage};

/// Delivers messages
///
/// Implemented by [`SmtpTransport`], [`ConsoleTransport`] and the
/// recording transport in [`crate::testing`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver a message
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the message is invalid or delivery fails
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}
