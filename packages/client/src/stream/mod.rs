//! Byte stream interfaces and framing transforms
//!
//! The readable side of every layer is plain [`std::io::Read`]: `Ok(0)` for a
//! non-empty buffer is the end of the logical message, and `WouldBlock` is the
//! "no data yet" signal on non-blocking descriptors. The writable side is
//! [`Sink`], which adds the "more data coming" hint and an explicit end of
//! message.

use std::io;

pub mod chunked;
pub mod delimited;
#[cfg(feature = "gzip")]
pub mod gzip;
pub mod limited;
pub mod transport;

pub use chunked::{ChunkedDecoder, ChunkedEncoder};
pub use delimited::read_delimited;
#[cfg(feature = "gzip")]
pub use gzip::GzipLayer;
pub use limited::LengthLimit;
pub use transport::Transport;

/// Push-based writable byte stream.
pub trait Sink {
    /// Writes `buf`, returning how many bytes were accepted.
    ///
    /// `more` hints that further data follows immediately, so the sink may
    /// hold the bytes back instead of flushing them to the peer.
    fn write(&mut self, buf: &[u8], more: bool) -> io::Result<usize>;

    /// Ends the logical message and flushes everything pending.
    fn finish(&mut self) -> io::Result<()>;
}

impl<T: Sink + ?Sized> Sink for &mut T {
    fn write(&mut self, buf: &[u8], more: bool) -> io::Result<usize> {
        (**self).write(buf, more)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

impl Sink for Vec<u8> {
    fn write(&mut self, buf: &[u8], _more: bool) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn incomplete() -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        crate::error::IncompleteMessage,
    )
}
