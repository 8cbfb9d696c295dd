use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body text for unexpected failures; details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "500 Internal Server Error: The server encountered an internal error and was unable to complete your request. Either the server is overloaded or there is an error in the application.";

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ErrorShape {
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("The requested resource was not found.")]
    NotFound,

    #[error("Request exceeded the {seconds}s timeout")]
    Timeout { seconds: u64 },

    #[error("{reason}")]
    Internal { reason: String },

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Database unavailable: {reason}")]
    DatabaseUnavailable { reason: String },

    #[error("Unsupported database URL scheme: {scheme:?}")]
    UnsupportedDatabase { scheme: String },

    #[error("Invalid database URL: {reason}")]
    InvalidDatabaseUrl { reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("DB_URL is not set in environment")]
    MissingDatabaseUrl,

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ServiceError {
    pub fn internal() -> Self {
        ServiceError::Internal {
            reason: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape {
            error: self.error_code().to_string(),
            message: self.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound => "not_found",
            ServiceError::Timeout { .. } => "timeout",
            ServiceError::Internal { .. } => "server_error",
            ServiceError::Database(_) => "server_error",
            ServiceError::DatabaseUnavailable { .. } => "server_error",
            ServiceError::UnsupportedDatabase { .. } => "server_error",
            ServiceError::InvalidDatabaseUrl { .. } => "server_error",
            ServiceError::Config(_) => "server_error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::NotFound => 404,
            ServiceError::Timeout { .. } => 503,
            ServiceError::Internal { .. } => 500,
            ServiceError::Database(_) => 500,
            ServiceError::DatabaseUnavailable { .. } => 503,
            ServiceError::UnsupportedDatabase { .. } => 500,
            ServiceError::InvalidDatabaseUrl { .. } => 500,
            ServiceError::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_matches_public_shape() {
        let shape = ServiceError::NotFound.to_error_shape();
        assert_eq!(shape.error, "not_found");
        assert_eq!(shape.message, "The requested resource was not found.");
        assert_eq!(ServiceError::NotFound.http_status(), 404);
    }

    #[test]
    fn internal_error_carries_reason_as_message() {
        let err = ServiceError::Internal {
            reason: "division by zero".to_string(),
        };
        assert_eq!(err.error_code(), "server_error");
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.to_error_shape().message, "division by zero");
    }

    #[test]
    fn generic_internal_error_hides_details() {
        let shape = ServiceError::internal().to_error_shape();
        assert_eq!(shape.error, "server_error");
        assert!(shape.message.starts_with("500 Internal Server Error"));
    }

    #[test]
    fn timeout_is_service_unavailable() {
        let err = ServiceError::Timeout { seconds: 90 };
        assert_eq!(err.http_status(), 503);
        assert_eq!(err.error_code(), "timeout");
        assert!(err.to_string().contains("90s"));
    }

    #[test]
    fn missing_db_url_message() {
        let err: ServiceError = ConfigError::MissingDatabaseUrl.into();
        assert_eq!(err.to_string(), "DB_URL is not set in environment");
    }
}
