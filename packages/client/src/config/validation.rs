//! Core Configuration Utilities
//!
//! Common configuration patterns, validation, and utilities.

use std::time::Duration;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid buffer size: {0}")]
    InvalidBufferSize(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails.
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum buffer size accepted anywhere in the configuration (16MB)
    pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if the duration is zero
    /// or exceeds one hour.
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }
        if timeout > Duration::from_secs(3600) {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }
        Ok(())
    }

    /// Validate buffer size
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidBufferSize` if the size is zero or
    /// above [`Self::MAX_BUFFER_SIZE`].
    pub fn validate_buffer_size(size: usize, name: &str) -> ConfigResult<()> {
        if size == 0 {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot be zero"
            )));
        }
        if size > Self::MAX_BUFFER_SIZE {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot exceed {} bytes",
                Self::MAX_BUFFER_SIZE
            )));
        }
        Ok(())
    }

    /// Validate that a numeric parameter lies within `[min, max]`
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` when out of range.
    pub fn validate_range(value: i64, min: i64, max: i64, name: &str) -> ConfigResult<()> {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }
}
