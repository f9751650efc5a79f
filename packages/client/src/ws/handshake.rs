//! RFC 6455 opening handshake, server side

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::BytesMut;
use http::{Method, StatusCode, Version};
use sha1::{Digest, Sha1};

use crate::http::{HeaderCollection, RequestHead, ResponseHead};

/// Magic GUID appended to the client key before hashing.
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

const SUPPORTED_VERSION: &str = "13";

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("malformed request head: {0}")]
    Malformed(#[source] crate::Error),
    #[error("request head exceeds {0} bytes")]
    TooLarge(usize),
    #[error("data received before the upgrade completed")]
    EarlyData,
    #[error("method must be GET")]
    Method,
    #[error("upgrade requires HTTP/1.1")]
    Version,
    #[error("missing `Upgrade: websocket`")]
    MissingUpgrade,
    #[error("missing `Connection: upgrade`")]
    MissingConnectionUpgrade,
    #[error("unsupported Sec-WebSocket-Version")]
    UnsupportedVersion,
    #[error("missing or malformed Sec-WebSocket-Key")]
    InvalidKey,
}

/// `Sec-WebSocket-Accept` value: base64 of SHA-1 over the key and [`WS_GUID`].
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Checks that `request` is an eligible upgrade and returns its key.
pub fn validate(request: &RequestHead) -> Result<&str, HandshakeError> {
    if request.method != Method::GET {
        return Err(HandshakeError::Method);
    }
    if request.version != Version::HTTP_11 {
        return Err(HandshakeError::Version);
    }

    let headers = &request.headers;
    if !headers.find_token("Upgrade", "websocket") {
        return Err(HandshakeError::MissingUpgrade);
    }
    if !headers.find_token("Connection", "upgrade") {
        return Err(HandshakeError::MissingConnectionUpgrade);
    }
    if headers.get("Sec-WebSocket-Version").map(str::trim) != Some(SUPPORTED_VERSION) {
        return Err(HandshakeError::UnsupportedVersion);
    }

    let key = headers
        .get("Sec-WebSocket-Key")
        .map(str::trim)
        .ok_or(HandshakeError::InvalidKey)?;
    match STANDARD.decode(key) {
        Ok(nonce) if nonce.len() == 16 => Ok(key),
        _ => Err(HandshakeError::InvalidKey),
    }
}

/// The `101 Switching Protocols` head for a validated key.
pub fn switching_protocols(key: &str) -> ResponseHead {
    let mut response = ResponseHead::new(StatusCode::SWITCHING_PROTOCOLS);
    response.headers.append("Upgrade", "websocket");
    response.headers.append("Connection", "Upgrade");
    response.headers.append("Sec-WebSocket-Accept", accept_key(key));
    response
}

/// Encoded `400 Bad Request` sent, best effort, before closing a rejected connection.
pub fn rejection(err: &HandshakeError) -> BytesMut {
    let mut response = ResponseHead::new(StatusCode::BAD_REQUEST);
    let mut headers = HeaderCollection::new();
    if matches!(err, HandshakeError::UnsupportedVersion) {
        headers.append("Sec-WebSocket-Version", SUPPORTED_VERSION);
    }
    headers.append("Connection", "close");
    headers.append("Content-Length", "0");
    response.headers = headers;

    let mut out = BytesMut::with_capacity(128);
    // fixed, valid header set
    let _ = response.encode(&mut out);
    out
}
