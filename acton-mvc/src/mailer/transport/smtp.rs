//! SMTP transport
//!
//! Uses `lettre` to deliver messages through an SMTP relay.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::MailTransport;
use crate::mailer::{MailError, MailMessage};

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Require STARTTLS (default: true)
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Read the relay settings from the environment
    ///
    /// - `SMTP_HOST`: server hostname
    /// - `SMTP_PORT`: server port (default: 587)
    /// - `SMTP_USERNAME`, `SMTP_PASSWORD`: credentials
    /// - `SMTP_USE_TLS`: require STARTTLS (default: true)
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Config`] if a required variable is missing
    pub fn from_env() -> Result<Self, MailError> {
        let host = std::env::var("SMTP_HOST")
            .map_err(|_| MailError::config("SMTP_HOST environment variable not set"))?;

        let port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|_| MailError::config("SMTP_PORT must be a valid port number"))?;

        let username = std::env::var("SMTP_USERNAME")
            .map_err(|_| MailError::config("SMTP_USERNAME environment variable not set"))?;

        let password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| MailError::config("SMTP_PASSWORD environment variable not set"))?;

        let use_tls = std::env::var("SMTP_USE_TLS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            username,
            password,
            use_tls,
        })
    }
}

/// Delivers messages through an SMTP relay
///
/// The relay connection is built once and reused for every message.
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Connect to the relay described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Smtp`] if TLS parameters cannot be built for the host
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let builder = if config.use_tls {
            let tls_parameters = TlsParameters::new(config.host.clone())
                .map_err(|e| MailError::smtp(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::smtp(e.to_string()))?
                .credentials(credentials)
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(credentials)
        };

        Ok(Self {
            relay: builder.port(config.port).build(),
        })
    }

    /// Connect using [`SmtpConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Configuration or TLS errors
    pub fn from_env() -> Result<Self, MailError> {
        Self::new(&SmtpConfig::from_env()?)
    }
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        let message = message.to_lettre()?;
        self.relay
            .send(message)
            .await
            .map_err(|e| MailError::smtp(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(use_tls: bool) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 2525,
            username: "user@example.com".to_string(),
            password: "password123".to_string(),
            use_tls,
        }
    }

    #[test]
    fn test_smtp_config_from_env() {
        std::env::set_var("SMTP_HOST", "smtp.example.com");
        std::env::set_var("SMTP_USERNAME", "user@example.com");
        std::env::set_var("SMTP_PASSWORD", "password123");
        std::env::remove_var("SMTP_PORT");
        std::env::remove_var("SMTP_USE_TLS");

        let config = SmtpConfig::from_env().unwrap();

        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.username, "user@example.com");
        assert!(config.use_tls);
    }

    #[tokio::test]
    async fn test_transport_builds_for_both_tls_modes() {
        assert!(SmtpTransport::new(&config(true)).is_ok());
        assert!(SmtpTransport::new(&config(false)).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_message_never_reaches_relay() {
        let transport = SmtpTransport::new(&config(false)).unwrap();
        let message = MailMessage::new().from("noreply@myapp.com").subject("Test").text("x");

        let result = transport.send(&message).await;
        assert!(matches!(result, Err(MailError::NoRecipients)));
    }
}
