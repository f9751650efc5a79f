//! TLS-specific error types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read trust anchors from {}: {source}", .path.display())]
    TrustFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no usable trust anchors in {0}")]
    NoTrustAnchors(String),
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),
    #[error("peer closed the connection during the handshake")]
    HandshakeEof,
    #[error("TLS configuration rejected: {0}")]
    Config(#[from] rustls::Error),
}
