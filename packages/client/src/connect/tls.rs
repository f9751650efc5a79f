use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};

use super::{Connector, connect_any};
use crate::config::{TcpConfig, TlsConfig};
use crate::dns::{GaiResolver, Resolve};
use crate::error;
use crate::tls::{TlsError, client_config};

pub type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// TCP plus a blocking rustls handshake, verified against `host`.
///
/// A handshake failure on one candidate falls through to the next, the
/// same as a refused connect.
#[derive(Clone)]
pub struct TlsConnector<R = GaiResolver> {
    resolver: R,
    tcp: TcpConfig,
    config: Arc<ClientConfig>,
}

impl TlsConnector<GaiResolver> {
    pub fn new(tcp: TcpConfig, tls: &TlsConfig) -> crate::Result<Self> {
        Self::with_resolver(GaiResolver::new(), tcp, tls)
    }
}

impl<R: Resolve> TlsConnector<R> {
    pub fn with_resolver(resolver: R, tcp: TcpConfig, tls: &TlsConfig) -> crate::Result<Self> {
        Ok(Self::from_client_config(resolver, tcp, client_config(tls)?))
    }

    pub fn from_client_config(resolver: R, tcp: TcpConfig, config: Arc<ClientConfig>) -> Self {
        Self {
            resolver,
            tcp,
            config,
        }
    }

    fn handshake(&self, server_name: &ServerName<'static>, mut tcp: TcpStream) -> crate::Result<TlsStream> {
        let mut conn = ClientConnection::new(Arc::clone(&self.config), server_name.clone())
            .map_err(TlsError::from)?;
        while conn.is_handshaking() {
            let (read, written) = conn.complete_io(&mut tcp).map_err(error::tls)?;
            if read == 0 && written == 0 && conn.is_handshaking() {
                return Err(error::tls(TlsError::HandshakeEof));
            }
        }
        tracing::debug!(
            protocol = ?conn.protocol_version(),
            alpn = ?conn.alpn_protocol().map(String::from_utf8_lossy),
            "TLS handshake complete"
        );
        Ok(StreamOwned::new(conn, tcp))
    }
}

impl<R: Resolve> Connector for TlsConnector<R> {
    type Stream = TlsStream;

    fn connect(&self, host: &str, port: u16) -> crate::Result<TlsStream> {
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|_| TlsError::InvalidServerName(host.to_owned()))?;
        connect_any(&self.resolver, host, port, &self.tcp, |tcp| {
            self.handshake(&server_name, tcp)
        })
    }
}

impl<R> std::fmt::Debug for TlsConnector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConnector")
            .field("tcp", &self.tcp)
            .field("alpn", &self.config.alpn_protocols)
            .finish_non_exhaustive()
    }
}
