//! Security Configuration Module
//!
//! Trust anchors and negotiation priority for secure connections.

use std::path::PathBuf;

use super::validation::{ConfigResult, ConfigurationError, Validator};

/// TLS version enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    #[default]
    Tls12,
    Tls13,
}

/// Where server certificates are verified against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrustAnchors {
    /// The platform trust store.
    #[default]
    System,
    /// A PEM bundle of trusted certificates.
    File(PathBuf),
}

/// TLS connection configuration
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub trust: TrustAnchors,
    pub min_version: TlsVersion,
    /// ALPN protocols in preference order.
    pub alpn_protocols: Vec<Vec<u8>>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            trust: TrustAnchors::System,
            min_version: TlsVersion::Tls12,
            alpn_protocols: vec![b"http/1.1".to_vec()],
        }
    }
}

impl TlsConfig {
    /// Trust only the certificates in `ca_file`.
    #[must_use]
    pub fn with_ca_file(mut self, ca_file: impl Into<PathBuf>) -> Self {
        self.trust = TrustAnchors::File(ca_file.into());
        self
    }
}

impl Validator for TlsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let TrustAnchors::File(path) = &self.trust
            && path.as_os_str().is_empty()
        {
            return Err(ConfigurationError::InvalidParameter(
                "trust anchor file path is empty".to_string(),
            ));
        }
        if self.alpn_protocols.iter().any(|p| p.is_empty() || p.len() > 255) {
            return Err(ConfigurationError::InvalidParameter(
                "ALPN protocol names must be 1 to 255 bytes".to_string(),
            ));
        }
        Ok(())
    }
}
