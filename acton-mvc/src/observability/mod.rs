//! Structured logging
//!
//! Controllers and the mailer log through `tracing`; this module installs a
//! subscriber for applications that do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One JSON object per event
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            default_filter: if cfg!(debug_assertions) {
                "debug,acton_mvc=trace".to_string()
            } else {
                "info".to_string()
            },
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    /// Use `filter` when `RUST_LOG` is unset
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Use `format` for output
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber with default settings
///
/// Pretty output in debug builds, JSON in release builds; `RUST_LOG`
/// overrides the level filter.
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// acton_mvc::observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    init_with(&ObservabilityConfig::default())
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ObservabilityConfig::default()
            .with_filter("warn")
            .with_format(LogFormat::Json);
        assert_eq!(config.default_filter, "warn");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_second_init_fails() {
        let config = ObservabilityConfig::default().with_filter("off");
        let _ = init_with(&config);
        assert!(init_with(&config).is_err());
    }
}
