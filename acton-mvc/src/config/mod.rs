//! Configuration management for acton-mvc
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_` prefix, `__` nesting)
//! 2. `./config.toml` (or an explicit file)
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [controller]
//! default_action = "index"
//! layout = "layouts/main"
//!
//! [mailer]
//! use_file_transport = true
//! file_transport_path = "./runtime/mail"
//! html_layout = "layouts/mail-html"
//!
//! [mailer.message]
//! from = "noreply@myapp.com"
//!
//! [views]
//! view_dir = "./views"
//! extension = "html"
//! ```
//!
//! # Usage
//!
//! ```rust
//! use acton_mvc::config::ActonMvcConfig;
//!
//! let config = ActonMvcConfig::default();
//! assert_eq!(config.controller.default_action, "index");
//! assert!(!config.mailer.use_file_transport);
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Action run when a request names no action
    pub default_action: String,

    /// Layout wrapping rendered views
    pub layout: Option<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_action: "index".to_string(),
            layout: None,
        }
    }
}

/// Defaults applied to every composed message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDefaults {
    /// Sender address
    pub from: Option<String>,

    /// Reply-To address
    pub reply_to: Option<String>,
}

/// Mailer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerSettings {
    /// Write messages to disk instead of delivering them
    pub use_file_transport: bool,

    /// Directory receiving messages in file-transport mode
    pub file_transport_path: PathBuf,

    /// Layout wrapping HTML bodies
    pub html_layout: Option<String>,

    /// Layout wrapping plain text bodies
    pub text_layout: Option<String>,

    /// Defaults applied to composed messages
    pub message: MessageDefaults,
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            use_file_transport: false,
            file_transport_path: PathBuf::from("./runtime/mail"),
            html_layout: None,
            text_layout: None,
            message: MessageDefaults::default(),
        }
    }
}

/// View configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Directory containing view templates
    pub view_dir: PathBuf,

    /// Extension appended to view names without one
    pub extension: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            view_dir: PathBuf::from("./views"),
            extension: "html".to_string(),
        }
    }
}

/// Complete acton-mvc configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActonMvcConfig {
    /// Controller settings
    #[serde(default)]
    pub controller: ControllerSettings,

    /// Mailer settings
    #[serde(default)]
    pub mailer: MailerSettings,

    /// View settings
    #[serde(default)]
    pub views: ViewSettings,
}

impl ActonMvcConfig {
    /// Load configuration from `./config.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - `./config.toml` exists but cannot be parsed
    /// - Configuration values fail type conversion
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_mvc::config::ActonMvcConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActonMvcConfig::load()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // Environment variables (highest priority, double underscore for nesting)
        figment = figment.merge(Env::prefixed("ACTON_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_mvc::config::ActonMvcConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActonMvcConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed("ACTON_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ActonMvcConfig::default();
        assert_eq!(config.controller.default_action, "index");
        assert!(config.controller.layout.is_none());
        assert!(!config.mailer.use_file_transport);
        assert_eq!(
            config.mailer.file_transport_path,
            PathBuf::from("./runtime/mail")
        );
        assert_eq!(config.views.extension, "html");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[controller]
default_action = "home"

[mailer]
use_file_transport = true

[mailer.message]
from = "noreply@myapp.com"
"#,
        )
        .unwrap();

        let config = ActonMvcConfig::load_from(&path).unwrap();
        assert_eq!(config.controller.default_action, "home");
        assert!(config.mailer.use_file_transport);
        assert_eq!(config.mailer.message.from.as_deref(), Some("noreply@myapp.com"));
        // untouched sections keep their defaults
        assert_eq!(config.views.view_dir, PathBuf::from("./views"));
    }
}
