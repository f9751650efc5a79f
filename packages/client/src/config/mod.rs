//! Configuration for client connections and the upgrade server
//!
//! Plain `Default`-implementing structs, checked through [`Validator`] before
//! they are used to open connections or bind listeners.

pub mod network;
pub mod security;
pub mod server;
pub mod validation;

pub use network::TcpConfig;
pub use security::{TlsConfig, TlsVersion, TrustAnchors};
pub use server::ServerConfig;
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Default upper bound for a response header block.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// Compression configuration
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Advertise `Accept-Encoding: gzip` unless the caller already did.
    ///
    /// Only meaningful when the `gzip` feature is compiled in.
    pub request_gzip: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { request_gzip: true }
    }
}

/// HTTP-specific configuration for client behavior
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub tcp: TcpConfig,
    pub tls: TlsConfig,
    pub compression: CompressionConfig,

    /// Largest response header block accepted, terminator included.
    pub max_header_bytes: usize,

    /// Inbound transport buffer capacity.
    pub read_buffer_size: usize,

    /// Pending outbound bytes that force a flush even when more data is coming.
    pub write_high_water: usize,

    /// Sent as `User-Agent` by the facade when the caller does not set one.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            tcp: TcpConfig::default(),
            tls: TlsConfig::default(),
            compression: CompressionConfig::default(),
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            read_buffer_size: 8 * 1024,
            write_high_water: 16 * 1024,
            user_agent: concat!("spindle/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Validator for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.tcp.validate()?;
        self.tls.validate()?;
        ConfigValidator::validate_buffer_size(self.max_header_bytes, "max_header_bytes")?;
        ConfigValidator::validate_buffer_size(self.read_buffer_size, "read_buffer_size")?;
        ConfigValidator::validate_buffer_size(self.write_high_water, "write_high_water")?;
        if self.user_agent.is_empty() {
            return Err(ConfigurationError::InvalidParameter(
                "user_agent cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
