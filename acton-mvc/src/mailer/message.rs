//! Mail messages with a fluent builder API

use std::fmt;

use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};
use serde::{Deserialize, Serialize};

use super::MailError;

/// A mailbox: address plus optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address
    pub address: String,

    /// Display name
    pub name: Option<String>,
}

impl Recipient {
    /// Bare address
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Address with a display name
    #[must_use]
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }

    fn mailbox(&self) -> Result<Mailbox, MailError> {
        let address: Address = self
            .address
            .parse()
            .map_err(|_| MailError::InvalidAddress(self.address.clone()))?;
        Ok(Mailbox::new(self.name.clone(), address))
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

impl From<(&str, &str)> for Recipient {
    fn from((address, name): (&str, &str)) -> Self {
        Self::named(address, name)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// A mail message
///
/// ```rust
/// use acton_mvc::mailer::MailMessage;
///
/// let message = MailMessage::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Welcome!")
///     .text("Welcome to our app!")
///     .html("<h1>Welcome to our app!</h1>");
///
/// assert!(message.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipients (To)
    pub to: Vec<Recipient>,

    /// Sender (From)
    pub from: Option<Recipient>,

    /// Reply-To address
    pub reply_to: Option<Recipient>,

    /// CC recipients
    pub cc: Vec<Recipient>,

    /// BCC recipients
    pub bcc: Vec<Recipient>,

    /// Subject line
    pub subject: Option<String>,

    /// Plain text body
    pub text: Option<String>,

    /// HTML body
    pub html: Option<String>,
}

impl MailMessage {
    /// Create an empty message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient (To)
    #[must_use]
    pub fn to(mut self, recipient: impl Into<Recipient>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Add several recipients (To)
    #[must_use]
    pub fn to_multiple(mut self, addresses: &[&str]) -> Self {
        self.to.extend(addresses.iter().copied().map(Recipient::from));
        self
    }

    /// Set the sender
    #[must_use]
    pub fn from(mut self, sender: impl Into<Recipient>) -> Self {
        self.from = Some(sender.into());
        self
    }

    /// Set the Reply-To address
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<Recipient>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Add a CC recipient
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<Recipient>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Add a BCC recipient
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<Recipient>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain text body
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// To addresses joined with `", "`, as they appear in send logs
    #[must_use]
    pub fn recipient_addresses(&self) -> String {
        self.to
            .iter()
            .map(|recipient| recipient.address.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether `address` is among the To recipients
    #[must_use]
    pub fn is_addressed_to(&self, address: &str) -> bool {
        self.to.iter().any(|recipient| recipient.address == address)
    }

    /// Check that the message can be delivered
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - No recipients
    /// - No sender
    /// - No subject
    /// - No content (text or HTML)
    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(MailError::NoRecipients);
        }

        if self.from.is_none() {
            return Err(MailError::NoSender);
        }

        if self.subject.is_none() {
            return Err(MailError::NoSubject);
        }

        if self.text.is_none() && self.html.is_none() {
            return Err(MailError::NoContent);
        }

        Ok(())
    }

    /// Build the wire-level `lettre` message
    ///
    /// Text and HTML together become a `multipart/alternative` body. Only a
    /// sender and at least one recipient are required; a missing subject is
    /// left out and a missing body becomes an empty text part. Use
    /// [`validate`](Self::validate) for the full delivery checks.
    ///
    /// # Errors
    ///
    /// [`MailError::NoSender`], [`MailError::NoRecipients`],
    /// [`MailError::InvalidAddress`] for unparsable addresses and
    /// [`MailError::Smtp`] when `lettre` rejects the message.
    pub fn to_lettre(&self) -> Result<Message, MailError> {
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(MailError::NoRecipients);
        }
        let from = self.from.as_ref().ok_or(MailError::NoSender)?;
        let mut builder = Message::builder().from(from.mailbox()?);

        for recipient in &self.to {
            builder = builder.to(recipient.mailbox()?);
        }
        for recipient in &self.cc {
            builder = builder.cc(recipient.mailbox()?);
        }
        for recipient in &self.bcc {
            builder = builder.bcc(recipient.mailbox()?);
        }
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.mailbox()?);
        }
        if let Some(subject) = &self.subject {
            builder = builder.subject(subject);
        }

        let message = match (&self.html, &self.text) {
            (Some(html), Some(text)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            (Some(html), None) => builder
                .header(header::ContentType::TEXT_HTML)
                .body(html.clone()),
            (None, text) => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(text.clone().unwrap_or_default()),
        };

        message.map_err(|e| MailError::smtp(e.to_string()))
    }

    /// Serialize the message as an RFC 5322 `.eml` document
    ///
    /// # Errors
    ///
    /// Same as [`to_lettre`](Self::to_lettre).
    pub fn to_eml(&self) -> Result<Vec<u8>, MailError> {
        Ok(self.to_lettre()?.formatted())
    }
}
