use thiserror::Error;

use crate::config::error::ConfigError;

/// Application-wide error type.
///
/// Client-facing variants carry enough context to build a useful message;
/// backend variants carry the underlying source for logging only.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// No route matched the request
    #[error("Route not found")]
    RouteNotFound,

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Request body exceeded the configured limit
    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    /// Request body was not sent as JSON
    #[error("Unsupported media type: {message}")]
    UnsupportedMediaType { message: String },

    /// Storage operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Not-found error for a user looked up by id.
    pub fn user_not_found(id: impl ToString) -> Self {
        AppError::NotFound {
            entity: "user".to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    /// Wraps a storage failure with the operation that triggered it.
    pub fn database(operation: &str, source: impl Into<anyhow::Error>) -> Self {
        AppError::Database {
            operation: operation.to_string(),
            source: source.into(),
        }
    }

    /// True for errors whose details must not reach the client.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. }
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        AppError::database("query", error)
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        AppError::database("acquire connection", error)
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        AppError::Configuration {
            message: error.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    /// Reports the first failing field, in field-name order for stable output.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.into_iter().next() {
            Some((field, failures)) => AppError::Validation {
                field: field.to_string(),
                reason: failures
                    .first()
                    .and_then(|f| f.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            },
            None => AppError::Validation {
                field: "body".to_string(),
                reason: errors.to_string(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
