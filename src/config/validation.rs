//! Configuration validation logic
//!
//! Checks run after loading and again after CLI overrides are merged.

use axum::http::HeaderValue;

use crate::config::error::ConfigError;
use crate::config::settings::{DatabaseConfig, LoggerSettings, ServerConfig, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// URL schemes accepted for the real store
const VALID_DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Body limit must be greater than 0
    /// - Every allowed origin must be an http(s) origin usable as a header value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.body_limit == 0 {
            return Err(ConfigError::validation(
                "server.body_limit",
                "Body limit must be greater than 0 bytes.",
            ));
        }

        for origin in &self.allowed_origins {
            let is_http = origin.starts_with("http://") || origin.starts_with("https://");
            if !is_http || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::ValidationError {
                    field: "server.allowed_origins".to_string(),
                    message: format!(
                        "Invalid origin '{}'. Origins must look like http(s)://host[:port]",
                        origin
                    ),
                });
            }
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// Nothing is checked when the real store is disabled: the URL and pool
    /// sizes are never used in that case.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        self.validate_connection()
    }

    /// Validate the connection settings regardless of the `enabled` switch.
    ///
    /// Used by the `migrate` command, which always needs a reachable database.
    pub fn validate_connection(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required when the database is enabled.",
            ));
        }

        if !VALID_DATABASE_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        if self.file.enabled {
            if self.file.path.trim().is_empty() {
                return Err(ConfigError::validation(
                    "logger.file.path",
                    "File path cannot be empty when file output is enabled.",
                ));
            }

            let format = self.file.format.to_lowercase();
            if !VALID_LOG_FORMATS.contains(&format.as_str()) {
                return Err(ConfigError::ValidationError {
                    field: "logger.file.format".to_string(),
                    message: format!(
                        "Invalid log format '{}'. Valid formats are: {}",
                        self.file.format,
                        VALID_LOG_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
