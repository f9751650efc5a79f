//! rustls client configuration

use std::sync::Arc;

use rustls::version::{TLS12, TLS13};
use rustls::{ClientConfig, SupportedProtocolVersion};

use crate::config::{TlsConfig, TlsVersion};

mod errors;
mod trust;

pub use errors::TlsError;
pub use trust::root_store;

static TLS12_AND_LATER: &[&SupportedProtocolVersion] = &[&TLS13, &TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&TLS13];

/// Builds a rustls client configuration from `config`.
///
/// Uses the ring provider, the configured minimum protocol version and
/// the ALPN list in preference order.
pub fn client_config(config: &TlsConfig) -> Result<Arc<ClientConfig>, TlsError> {
    let versions = match config.min_version {
        TlsVersion::Tls12 => TLS12_AND_LATER,
        TlsVersion::Tls13 => TLS13_ONLY,
    };

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut client = ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(versions)?
        .with_root_certificates(root_store(&config.trust)?)
        .with_no_client_auth();
    client.alpn_protocols.clone_from(&config.alpn_protocols);

    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_alpn_and_versions() {
        let config = TlsConfig {
            min_version: TlsVersion::Tls13,
            alpn_protocols: vec![b"http/1.1".to_vec()],
            ..TlsConfig::default()
        };
        let client = client_config(&config).unwrap();
        assert_eq!(client.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }
}
