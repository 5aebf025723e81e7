//! Mail composition and sending
//!
//! [`Mailer::send`] runs every message through the same pipeline:
//!
//! 1. `beforeSend` hook; a cancelled event skips delivery and reports `false`
//! 2. log the subject and recipients
//! 3. deliver: save to an `.eml` file in file-transport mode, otherwise hand
//!    the message to the [`MailTransport`]
//! 4. `afterSend` hook with the outcome
//!
//! Delivery problems (transport errors, messages the transport rejects,
//! files that cannot be written) are logged and reported as `false`; they
//! never raise. Only a failing hook observer raises.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use acton_mvc::mailer::{ConsoleTransport, MailMessage, Mailer};
//!
//! # async fn example() -> Result<(), acton_mvc::mailer::MailError> {
//! let mailer = Mailer::builder(Arc::new(ConsoleTransport::new()))
//!     .on_before_send(|event| {
//!         event.message.subject = event.message.subject.take().map(|s| format!("[dev] {s}"));
//!         Ok(())
//!     })
//!     .build();
//!
//! let message = MailMessage::new()
//!     .to("user@example.com")
//!     .from("noreply@myapp.com")
//!     .subject("Welcome!")
//!     .text("Welcome to our app!");
//!
//! assert!(mailer.send(&message).await?);
//! # Ok(())
//! # }
//! ```

mod compose;
mod error;
mod event;
mod file;
mod message;
mod transport;

pub use compose::{html_to_text, MailViews};
pub use error::MailError;
pub use event::{MailEvent, MailerHooks};
pub use file::{FileNameCallback, FileNameGenerator};
pub use message::{MailMessage, Recipient};
#[cfg(test)]
pub use transport::MockMailTransport;
pub use transport::{ConsoleTransport, MailTransport, SmtpConfig, SmtpTransport};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::MailerSettings;
use crate::view::ViewRenderer;

/// Sends messages through hooks, logging and a transport
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    settings: MailerSettings,
    view: Option<Arc<dyn ViewRenderer>>,
    hooks: MailerHooks,
    file_name: Option<FileNameCallback>,
    names: FileNameGenerator,
}

impl Mailer {
    /// Start building a mailer delivering through `transport`
    #[must_use]
    pub fn builder(transport: Arc<dyn MailTransport>) -> MailerBuilder {
        MailerBuilder::new(transport)
    }

    /// Mailer configured from the `[mailer]` section
    #[must_use]
    pub fn from_settings(settings: &MailerSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self::builder(transport).settings(settings.clone()).build()
    }

    /// Active settings
    #[must_use]
    pub const fn settings(&self) -> &MailerSettings {
        &self.settings
    }

    /// Whether messages are saved to files instead of delivered
    #[must_use]
    pub const fn uses_file_transport(&self) -> bool {
        self.settings.use_file_transport
    }

    /// Send hooks
    #[must_use]
    pub const fn hooks(&self) -> &MailerHooks {
        &self.hooks
    }

    /// Mutable access to the send hooks
    pub fn hooks_mut(&mut self) -> &mut MailerHooks {
        &mut self.hooks
    }

    /// Send one message
    ///
    /// Returns whether the message was delivered (or saved, in
    /// file-transport mode). A cancelled `beforeSend` yields `Ok(false)`
    /// without reaching `afterSend`; every delivery failure yields
    /// `Ok(false)` after `afterSend` has seen it.
    ///
    /// # Errors
    ///
    /// [`MailError::Hook`] when an observer fails.
    pub async fn send(&self, message: &MailMessage) -> Result<bool, MailError> {
        let mut event = MailEvent::new(message.clone());
        if !self
            .hooks
            .before_send
            .allows(&mut event)
            .map_err(MailError::Hook)?
        {
            return Ok(false);
        }

        let message = &event.message;
        info!(
            subject = message.subject.as_deref().unwrap_or_default(),
            to = %message.recipient_addresses(),
            "Sending email \"{}\" to \"{}\"",
            message.subject.as_deref().unwrap_or_default(),
            message.recipient_addresses()
        );

        let delivered = if self.settings.use_file_transport {
            self.save_message(message).await.map(|_| ())
        } else {
            self.transport.send(message).await
        };
        let is_successful = match delivered {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    error = %err,
                    to = %message.recipient_addresses(),
                    file_transport = self.settings.use_file_transport,
                    "Mail delivery failed"
                );
                false
            }
        };

        event.is_successful = is_successful;
        self.hooks
            .after_send
            .trigger(&mut event)
            .map_err(MailError::Hook)?;

        Ok(is_successful)
    }

    /// Send messages one after another
    ///
    /// Returns the number of messages sent successfully. Each message
    /// succeeds or fails on its own: a message whose hook observer fails
    /// counts as not sent and the batch carries on.
    pub async fn send_multiple(&self, messages: &[MailMessage]) -> usize {
        let mut sent = 0;
        for message in messages {
            match self.send(message).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(error = %err, to = %message.recipient_addresses(), "Skipping message");
                }
            }
        }
        sent
    }

    async fn save_message(&self, message: &MailMessage) -> Result<PathBuf, MailError> {
        let file_name = match &self.file_name {
            Some(callback) => callback(message),
            None => self.names.next_name(),
        };
        file::save_message(&self.settings.file_transport_path, &file_name, message).await
    }
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .field("custom_file_name", &self.file_name.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Mailer`]
pub struct MailerBuilder {
    transport: Arc<dyn MailTransport>,
    settings: MailerSettings,
    view: Option<Arc<dyn ViewRenderer>>,
    hooks: MailerHooks,
    file_name: Option<FileNameCallback>,
}

impl MailerBuilder {
    fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            settings: MailerSettings::default(),
            view: None,
            hooks: MailerHooks::default(),
            file_name: None,
        }
    }

    /// Replace all settings
    #[must_use]
    pub fn settings(mut self, settings: MailerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Save messages under `path` instead of delivering them
    #[must_use]
    pub fn file_transport(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.use_file_transport = true;
        self.settings.file_transport_path = path.into();
        self
    }

    /// Compute file-transport file names with `callback`
    #[must_use]
    pub fn file_name<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MailMessage) -> String + Send + Sync + 'static,
    {
        self.file_name = Some(Arc::new(callback));
        self
    }

    /// View renderer used by [`Mailer::compose`]
    #[must_use]
    pub fn view_renderer(mut self, view: Arc<dyn ViewRenderer>) -> Self {
        self.view = Some(view);
        self
    }

    /// Attach a `beforeSend` observer
    #[must_use]
    pub fn on_before_send<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut MailEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_send.attach(observer);
        self
    }

    /// Attach an `afterSend` observer
    #[must_use]
    pub fn on_after_send<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut MailEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_send.attach(observer);
        self
    }

    /// Finish the mailer
    #[must_use]
    pub fn build(self) -> Mailer {
        Mailer {
            transport: self.transport,
            settings: self.settings,
            view: self.view,
            hooks: self.hooks,
            file_name: self.file_name,
            names: FileNameGenerator::new(),
        }
    }
}

impl fmt::Debug for MailerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerBuilder")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    fn message(subject: &str) -> MailMessage {
        MailMessage::new()
            .to("user@example.com")
            .to("second@example.com")
            .from("noreply@myapp.com")
            .subject(subject)
            .text("Hello")
    }

    #[tokio::test]
    async fn test_successful_send_reports_true() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|m: &MailMessage| m.subject.as_deref() == Some("Hi"))
            .times(1)
            .returning(|_| Ok(()));

        let mailer = Mailer::builder(Arc::new(transport)).build();
        assert!(mailer.send(&message("Hi")).await.unwrap());
    }

    #[tokio::test]
    async fn test_transport_failure_reports_false() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(MailError::smtp("connection refused")));

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&outcomes);
        let mailer = Mailer::builder(Arc::new(transport))
            .on_after_send(move |event| {
                seen.lock().push(event.is_successful);
                Ok(())
            })
            .build();

        assert!(!mailer.send(&message("Hi")).await.unwrap());
        assert_eq!(*outcomes.lock(), vec![false]);
    }

    #[tokio::test]
    async fn test_cancelled_before_send_skips_transport() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let after = Arc::new(Mutex::new(0));
        let calls = Arc::clone(&after);
        let mailer = Mailer::builder(Arc::new(transport))
            .on_before_send(|event| {
                event.is_valid = false;
                Ok(())
            })
            .on_after_send(move |_| {
                *calls.lock() += 1;
                Ok(())
            })
            .build();

        assert!(!mailer.send(&message("Hi")).await.unwrap());
        assert_eq!(*after.lock(), 0);
    }

    #[tokio::test]
    async fn test_before_send_may_edit_message() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|m: &MailMessage| m.subject.as_deref() == Some("[dev] Hi"))
            .times(1)
            .returning(|_| Ok(()));

        let mailer = Mailer::builder(Arc::new(transport))
            .on_before_send(|event| {
                event.message.subject = event.message.subject.take().map(|s| format!("[dev] {s}"));
                Ok(())
            })
            .build();

        assert!(mailer.send(&message("Hi")).await.unwrap());
    }

    #[tokio::test]
    async fn test_send_multiple_counts_successes() {
        let mut transport = MockMailTransport::new();
        let mut seq = Sequence::new();
        for outcome in [true, false, true] {
            transport
                .expect_send()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| {
                    if outcome {
                        Ok(())
                    } else {
                        Err(MailError::smtp("rejected"))
                    }
                });
        }

        let mailer = Mailer::builder(Arc::new(transport)).build();
        let messages = [message("a"), message("b"), message("c")];
        assert_eq!(mailer.send_multiple(&messages).await, 2);
    }

    #[tokio::test]
    async fn test_send_multiple_continues_past_failing_observer() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|m: &MailMessage| m.subject.as_deref() != Some("b"))
            .times(2)
            .returning(|_| Ok(()));

        let mailer = Mailer::builder(Arc::new(transport))
            .on_before_send(|event| {
                if event.message.subject.as_deref() == Some("b") {
                    anyhow::bail!("observer failed");
                }
                Ok(())
            })
            .build();

        let messages = [message("a"), message("b"), message("c")];
        assert_eq!(mailer.send_multiple(&messages).await, 2);
    }

    #[tokio::test]
    async fn test_hook_error_propagates() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let mailer = Mailer::builder(Arc::new(transport))
            .on_before_send(|_| Err(anyhow::anyhow!("observer failed")))
            .build();

        let err = mailer.send(&message("Hi")).await.unwrap_err();
        assert!(matches!(err, MailError::Hook(_)));
    }

    #[tokio::test]
    async fn test_rejected_message_reports_false_to_after_send() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|m: &MailMessage| m.validate());

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&outcomes);
        let mailer = Mailer::builder(Arc::new(transport))
            .on_after_send(move |event| {
                seen.lock().push(event.is_successful);
                Ok(())
            })
            .build();

        let sent = mailer
            .send(&MailMessage::new().from("noreply@myapp.com").subject("x").text("y"))
            .await
            .unwrap();
        assert!(!sent);
        assert_eq!(*outcomes.lock(), vec![false]);
    }

    #[tokio::test]
    async fn test_file_transport_saves_incomplete_message() {
        let temp = TempDir::new().unwrap();
        let mailer = Mailer::builder(Arc::new(MockMailTransport::new()))
            .file_transport(temp.path())
            .file_name(|_| "draft.eml".to_string())
            .build();

        let draft = MailMessage::new().to("user@example.com").from("noreply@myapp.com");
        assert!(mailer.send(&draft).await.unwrap());
        assert!(temp.path().join("draft.eml").exists());
    }

    #[tokio::test]
    async fn test_file_transport_unserializable_message_reports_false() {
        let temp = TempDir::new().unwrap();
        let mailer = Mailer::builder(Arc::new(MockMailTransport::new()))
            .file_transport(temp.path())
            .build();

        let no_sender = MailMessage::new().to("user@example.com").subject("x");
        assert!(!mailer.send(&no_sender).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_transport_writes_eml() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("mail");
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let mailer = Mailer::builder(Arc::new(transport))
            .file_transport(&dir)
            .build();

        assert!(mailer.uses_file_transport());
        assert!(mailer.send(&message("Saved")).await.unwrap());

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let entry = entries.next_entry().await.unwrap().unwrap();
        let name = entry.file_name().into_string().unwrap();
        assert!(name.ends_with(".eml"));
        let content = tokio::fs::read_to_string(entry.path()).await.unwrap();
        assert!(content.contains("Subject: Saved"));
    }

    #[tokio::test]
    async fn test_file_name_callback() {
        let temp = TempDir::new().unwrap();
        let mailer = Mailer::builder(Arc::new(MockMailTransport::new()))
            .file_transport(temp.path())
            .file_name(|m| format!("{}.eml", m.subject.as_deref().unwrap_or("mail")))
            .build();

        assert!(mailer.send(&message("welcome")).await.unwrap());
        assert!(temp.path().join("welcome.eml").exists());
    }

    #[test]
    fn test_from_settings() {
        let settings = MailerSettings {
            use_file_transport: true,
            ..MailerSettings::default()
        };
        let mailer = Mailer::from_settings(&settings, Arc::new(MockMailTransport::new()));
        assert!(mailer.uses_file_transport());
        assert!(mailer.hooks().before_send.is_empty());
    }
}
