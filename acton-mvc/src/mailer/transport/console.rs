//! Console transport for development
//!
//! Logs messages instead of delivering them.

use async_trait::async_trait;
use tracing::{debug, info};

use super::MailTransport;
use crate::mailer::{MailError, MailMessage};

/// Logs messages through `tracing` instead of sending them
///
/// ```rust
/// use acton_mvc::mailer::{ConsoleTransport, MailMessage, MailTransport};
///
/// # async fn example() -> Result<(), acton_mvc::mailer::MailError> {
/// let transport = ConsoleTransport::new();
///
/// let message = MailMessage::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Hello!")
///     .text("Hello, World!");
///
/// transport.send(&message).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport {
    verbose: bool,
}

impl ConsoleTransport {
    /// Log message metadata only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log message bodies at debug level
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;

        let from = message.from.as_ref().ok_or(MailError::NoSender)?;
        let subject = message.subject.as_deref().ok_or(MailError::NoSubject)?;

        info!(
            from = %from,
            to = %message.recipient_addresses(),
            cc = message.cc.len(),
            bcc = message.bcc.len(),
            subject = %subject,
            "Console mail sent"
        );

        if self.verbose {
            debug!(
                reply_to = ?message.reply_to,
                has_html = message.html.is_some(),
                has_text = message.text.is_some(),
                "Mail details"
            );
            if let Some(text) = &message.text {
                debug!(text = %text, "Mail text content");
            }
            if let Some(html) = &message.html {
                debug!(html = %html, "Mail HTML content");
            }
        }

        Ok(())
    }
}
