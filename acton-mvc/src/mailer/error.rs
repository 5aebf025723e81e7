//! Mailer error types

use thiserror::Error;

/// Errors that can occur while composing or sending mail
#[derive(Debug, Error)]
pub enum MailError {
    /// Message has no recipients
    #[error("message must have at least one recipient")]
    NoRecipients,

    /// Message has no sender
    #[error("message must have a from address")]
    NoSender,

    /// Message has no subject
    #[error("message must have a subject")]
    NoSubject,

    /// Message has no body
    #[error("message must have either text or HTML content")]
    NoContent,

    /// Address could not be parsed
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Delivery through SMTP failed
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Transport misconfigured
    #[error("mailer configuration error: {0}")]
    Config(String),

    /// A `beforeSend` / `afterSend` observer failed
    #[error("mail hook error: {0}")]
    Hook(#[source] anyhow::Error),

    /// A mail view failed to render
    #[error("failed to render mail view: {0}")]
    View(#[source] anyhow::Error),

    /// Writing a message file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MailError {
    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::Smtp(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
