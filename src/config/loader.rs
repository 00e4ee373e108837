use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/navbridge/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("navbridge").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The implicit navigation prefix is not empty
    /// - The redirect prefix is not empty
    /// - The context path is empty or rooted without a trailing slash
    /// - The bind address parses
    /// - No mapping outcome carries the implicit prefix
    /// - No two mappings share outcome, action and component
    /// - The view state limits are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.navigation.implicit_prefix.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "navigation.implicit_prefix must not be empty".to_string(),
            });
        }

        if self.views.redirect_prefix.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "views.redirect_prefix must not be empty".to_string(),
            });
        }

        let context_path = &self.server.context_path;
        if !context_path.is_empty() && (!context_path.starts_with('/') || context_path.ends_with('/'))
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "server.context_path '{}' must start with '/' and not end with '/'",
                    context_path
                ),
            });
        }

        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid bind address '{}'", self.server.bind_addr),
            });
        }

        let prefix = &self.navigation.implicit_prefix;
        let mut seen = HashSet::new();
        for mapping in &self.navigation.mappings {
            // Both resolvers would claim the outcome.
            if mapping.outcome.starts_with(prefix.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "Navigation outcome '{}' starts with the implicit prefix '{}'",
                        mapping.outcome, prefix
                    ),
                });
            }
            if !seen.insert((&mapping.outcome, &mapping.from_action, &mapping.component_id)) {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "Navigation outcome '{}' is mapped more than once",
                        mapping.outcome
                    ),
                });
            }
        }

        if self.view_state.max_sessions == 0 || self.view_state.idle_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "view_state.max_sessions and view_state.idle_timeout_secs must be positive"
                    .to_string(),
            });
        }

        Ok(())
    }
}
