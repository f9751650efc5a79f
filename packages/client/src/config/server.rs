//! Upgrade server configuration

use super::validation::{ConfigResult, ConfigValidator, Validator};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Largest upgrade request head accepted, terminator included.
    pub max_handshake_bytes: usize,
    /// Listen backlog passed to `listen(2)`.
    pub backlog: i32,
    /// Accept IPv4 peers on IPv6 listeners.
    pub dual_stack: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_handshake_bytes: 8 * 1024,
            backlog: 128,
            dual_stack: true,
        }
    }
}

impl Validator for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_buffer_size(self.max_handshake_bytes, "max_handshake_bytes")?;
        ConfigValidator::validate_range(i64::from(self.backlog), 1, i64::from(i32::MAX), "backlog")
    }
}
