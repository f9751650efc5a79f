use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `spindle_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur establishing connections, exchanging
/// HTTP messages or upgrading WebSocket connections.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid configuration or request construction
    Builder,
    /// Every resolved candidate address failed to connect
    Connect,
    /// Malformed or unsupported wire content
    Protocol,
    /// The response body could not be decompressed
    Decode,
    /// TLS configuration, handshake or record failure
    Tls,
    /// A WebSocket opening handshake was rejected
    Handshake,
    /// Transport read or write failure
    Io,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("spindle_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.inner.kind {
            Kind::Builder => "builder error",
            Kind::Connect => "connect",
            Kind::Protocol => "protocol violation",
            Kind::Decode => "error decoding response body",
            Kind::Tls => "tls error",
            Kind::Handshake => "websocket handshake rejected",
            Kind::Io => "transport error",
        };
        match &self.inner.source {
            Some(source) => write!(f, "{prefix}: {source}"),
            None => f.write_str(prefix),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
