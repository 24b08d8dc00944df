use super::{ErrorCode, FederationError};
use std::path::Path;

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to FederationError with context
    fn to_federation(self, context: impl Into<String>) -> Result<T, FederationError>;

    /// Convert to FederationError with specific error type
    fn to_config_error(self, message: impl Into<String>) -> Result<T, FederationError>;
    fn to_table_error(self, message: impl Into<String>) -> Result<T, FederationError>;
    fn to_transport_error(self, message: impl Into<String>) -> Result<T, FederationError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_federation(self, context: impl Into<String>) -> Result<T, FederationError> {
        self.map_err(|e| FederationError::other(context).with_source(e))
    }

    fn to_config_error(self, message: impl Into<String>) -> Result<T, FederationError> {
        self.map_err(|e| FederationError::config(message).with_source(e))
    }

    fn to_table_error(self, message: impl Into<String>) -> Result<T, FederationError> {
        self.map_err(|e| FederationError::table(message).with_source(e))
    }

    fn to_transport_error(self, message: impl Into<String>) -> Result<T, FederationError> {
        self.map_err(|e| FederationError::transport(message).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for configuration
    pub fn config_not_found(path: impl AsRef<Path>) -> FederationError {
        FederationError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    /// A required configuration key is absent
    pub fn missing_config_key(key: &str) -> FederationError {
        FederationError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("Missing required configuration key '{}'", key),
        )
    }

    /// Create a not found error for an input table
    pub fn table_not_found(path: impl AsRef<Path>) -> FederationError {
        FederationError::table_with_code(
            ErrorCode::TABLE_NOT_FOUND,
            "Input table not found",
            Some(path.as_ref().to_path_buf()),
        )
    }

    /// A column referenced by name does not exist
    pub fn unknown_column(name: &str) -> FederationError {
        FederationError::table_with_code(
            ErrorCode::TABLE_UNKNOWN_COLUMN,
            format!("Column '{}' does not exist", name),
            None,
        )
    }

    /// A message arrived that the current phase cannot consume
    pub fn unexpected_message(
        phase: impl std::fmt::Display,
        expected: &str,
        got: &str,
    ) -> FederationError {
        FederationError::protocol(
            ErrorCode::PROTOCOL_UNEXPECTED_MESSAGE,
            phase,
            format!("expected {} message, got {}", expected, got),
        )
    }
}
