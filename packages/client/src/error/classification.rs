use std::error::Error as StdError;
use std::io;

use super::helpers::{IncompleteMessage, TrailersUnsupported};
use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error is from invalid configuration or request construction.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if no candidate address could be connected.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.inner.kind, Kind::Connect)
    }

    /// Returns true if the peer sent malformed or unsupported wire content.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self.inner.kind, Kind::Protocol)
    }

    /// Returns true if the response body failed to decompress.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.inner.kind, Kind::Decode)
    }

    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self.inner.kind, Kind::Tls)
    }

    #[must_use]
    pub fn is_handshake(&self) -> bool {
        matches!(self.inner.kind, Kind::Handshake)
    }

    /// Returns true if the response ended with trailer fields.
    #[must_use]
    pub fn is_trailers(&self) -> bool {
        self.find_source::<TrailersUnsupported>().is_some()
    }

    /// Returns true if the transport ended before the message was complete.
    #[must_use]
    pub fn is_incomplete_message(&self) -> bool {
        if self.find_source::<IncompleteMessage>().is_some() {
            return true;
        }
        self.find_source::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::UnexpectedEof)
    }

    /// Returns the raw OS error code carried anywhere in the source chain.
    #[must_use]
    pub fn os_error(&self) -> Option<i32> {
        self.find_source::<io::Error>()
            .and_then(io::Error::raw_os_error)
    }

    fn find_source<T: StdError + 'static>(&self) -> Option<&T> {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(found) = err.downcast_ref::<T>() {
                return Some(found);
            }
            // io::Error hides its payload from `source()`
            if let Some(io) = err.downcast_ref::<io::Error>()
                && let Some(found) = io.get_ref().and_then(|inner| inner.downcast_ref::<T>())
            {
                return Some(found);
            }
            source = err.source();
        }

        None
    }
}
