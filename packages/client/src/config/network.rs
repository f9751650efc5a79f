//! Network Configuration Module
//!
//! Socket options applied to every candidate before it connects.

use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, Validator};

/// TCP connection configuration
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// `SO_KEEPALIVE`; on by default.
    pub keepalive: bool,
    /// Idle time before keep-alive probes start, when the platform supports it.
    pub keepalive_idle: Option<Duration>,
    pub nodelay: bool,
    /// Bound on each blocking connect attempt. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            keepalive: true,
            keepalive_idle: None,
            nodelay: false,
            connect_timeout: None,
        }
    }
}

impl Validator for TcpConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(timeout) = self.connect_timeout {
            ConfigValidator::validate_timeout(timeout, "connect_timeout")?;
        }
        if let Some(idle) = self.keepalive_idle {
            ConfigValidator::validate_timeout(idle, "keepalive_idle")?;
        }
        Ok(())
    }
}
