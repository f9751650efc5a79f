use std::io;

use super::types::{Error, Kind};

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        // unwrap errors that already went through `From<Error> for io::Error`
        if error.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            let kind = error.kind();
            return match error.into_inner().map(|inner| inner.downcast::<Error>()) {
                Some(Ok(err)) => *err,
                _ => Error::new(Kind::Io).with(io::Error::from(kind)),
            };
        }
        let kind = match error.kind() {
            io::ErrorKind::InvalidData => Kind::Protocol,
            _ => Kind::Io,
        };
        Error::new(kind).with(error)
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match error.kind() {
            Kind::Protocol | Kind::Decode => io::ErrorKind::InvalidData,
            Kind::Connect => io::ErrorKind::ConnectionRefused,
            _ if error.is_incomplete_message() => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

impl From<httparse::Error> for Error {
    fn from(error: httparse::Error) -> Self {
        Error::new(Kind::Protocol).with(error)
    }
}

impl From<http::Error> for Error {
    fn from(error: http::Error) -> Self {
        Error::new(Kind::Builder).with(error)
    }
}

impl From<crate::config::ConfigurationError> for Error {
    fn from(error: crate::config::ConfigurationError) -> Self {
        Error::new(Kind::Builder).with(error)
    }
}

impl From<crate::ws::HandshakeError> for Error {
    fn from(error: crate::ws::HandshakeError) -> Self {
        Error::new(Kind::Handshake).with(error)
    }
}

#[cfg(feature = "tls")]
impl From<crate::tls::TlsError> for Error {
    fn from(error: crate::tls::TlsError) -> Self {
        Error::new(Kind::Tls).with(error)
    }
}
