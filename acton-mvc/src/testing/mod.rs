//! Test doubles for mail transports and application dispatch
//!
//! Both doubles record what they receive in memory for assertions and can
//! be scripted with the outcomes to report.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::controller::{ApplicationDispatcher, ExitStatus, Params};
use crate::error::DispatchError;
use crate::mailer::{MailError, MailMessage, MailTransport};

/// Mail transport that captures messages instead of delivering them
///
/// ```rust
/// use std::sync::Arc;
/// use acton_mvc::mailer::{MailMessage, Mailer};
/// use acton_mvc::testing::RecordingTransport;
///
/// # async fn example() -> Result<(), acton_mvc::mailer::MailError> {
/// let transport = RecordingTransport::with_outcomes([true, false]);
/// let mailer = Mailer::builder(Arc::new(transport.clone())).build();
///
/// let message = MailMessage::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Test")
///     .text("Hello");
///
/// assert!(mailer.send(&message).await?);
/// assert!(!mailer.send(&message).await?);
/// assert_eq!(transport.sent_count(), 1);
/// assert_eq!(transport.attempts(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<MailMessage>>>,
    attempts: Arc<Mutex<usize>>,
    outcomes: Arc<Mutex<VecDeque<bool>>>,
}

impl RecordingTransport {
    /// Transport that accepts every message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport reporting `outcomes` in order, then accepting everything
    #[must_use]
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        let transport = Self::default();
        transport.outcomes.lock().extend(outcomes);
        transport
    }

    /// Number of messages accepted
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Number of delivery attempts, failed ones included
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// All accepted messages
    #[must_use]
    pub fn sent_messages(&self) -> Vec<MailMessage> {
        self.sent.lock().clone()
    }

    /// Forget all recorded messages
    pub fn clear(&self) {
        self.sent.lock().clear();
        *self.attempts.lock() = 0;
    }

    /// Whether a message to `address` was accepted
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|message| message.is_addressed_to(address))
    }

    /// Whether a message with `subject` was accepted
    #[must_use]
    pub fn was_sent_with_subject(&self, subject: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|message| message.subject.as_deref() == Some(subject))
    }

    /// Last accepted message
    #[must_use]
    pub fn last_sent(&self) -> Option<MailMessage> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        *self.attempts.lock() += 1;

        if self.outcomes.lock().pop_front().unwrap_or(true) {
            self.sent.lock().push(message.clone());
            Ok(())
        } else {
            Err(MailError::smtp("delivery rejected by recording transport"))
        }
    }
}

/// Application dispatcher that records routed requests
///
/// Routes answer [`ExitStatus::OK`] unless scripted with
/// [`respond`](Self::respond).
#[derive(Debug, Clone, Default)]
pub struct RecordingApplication {
    dispatched: Arc<Mutex<Vec<(String, Params)>>>,
    ended: Arc<Mutex<Vec<ExitStatus>>>,
    responses: Arc<Mutex<HashMap<String, ExitStatus>>>,
}

impl RecordingApplication {
    /// Application answering every route with `0`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `route` with `status`
    #[must_use]
    pub fn respond(self, route: impl Into<String>, status: impl Into<ExitStatus>) -> Self {
        self.responses.lock().insert(route.into(), status.into());
        self
    }

    /// Routes dispatched so far, with their parameters
    #[must_use]
    pub fn dispatched(&self) -> Vec<(String, Params)> {
        self.dispatched.lock().clone()
    }

    /// Routes dispatched so far
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .iter()
            .map(|(route, _)| route.clone())
            .collect()
    }

    /// Statuses the request was ended with
    #[must_use]
    pub fn ended(&self) -> Vec<ExitStatus> {
        self.ended.lock().clone()
    }
}

impl ApplicationDispatcher for RecordingApplication {
    fn dispatch(&self, route: &str, params: &Params) -> Result<ExitStatus, DispatchError> {
        self.dispatched
            .lock()
            .push((route.to_string(), params.clone()));
        Ok(self
            .responses
            .lock()
            .get(route)
            .copied()
            .unwrap_or(ExitStatus::OK))
    }

    fn end(&self, status: ExitStatus) {
        self.ended.lock().push(status);
    }
}
