//! Buffered duplex around a connected stream

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

use bytes::BytesMut;

use super::Sink;

const DEFAULT_READ_CAPACITY: usize = 8 * 1024;
const DEFAULT_HIGH_WATER: usize = 16 * 1024;

/// Buffers both directions of a stream.
///
/// Reads go through a [`BufReader`] so framing layers can look ahead.
/// Writes accumulate until the caller signals that no more data is coming,
/// the message is finished, or the pending bytes pass the high-water mark.
pub struct Transport<S> {
    reader: BufReader<S>,
    pending: BytesMut,
    high_water: usize,
}

impl<S: Read + Write> Transport<S> {
    pub fn new(stream: S) -> Self {
        Self::with_capacity(DEFAULT_READ_CAPACITY, DEFAULT_HIGH_WATER, stream)
    }

    pub fn with_capacity(read_capacity: usize, high_water: usize, stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(read_capacity, stream),
            pending: BytesMut::with_capacity(high_water.min(DEFAULT_HIGH_WATER)),
            high_water,
        }
    }

    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }

    /// Inbound bytes already pulled from the stream but not yet consumed.
    pub fn buffered(&self) -> &[u8] {
        self.reader.buffer()
    }

    /// Outbound bytes accepted but not yet written to the stream.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Unwraps the stream, discarding buffered data in both directions.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        let stream = self.reader.get_mut();
        if !self.pending.is_empty() {
            stream.write_all(&self.pending)?;
            self.pending.clear();
        }
        stream.flush()
    }
}

impl<S: Read> Read for Transport<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<S: Read> BufRead for Transport<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt);
    }
}

impl<S: Read + Write> Sink for Transport<S> {
    fn write(&mut self, buf: &[u8], more: bool) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        if !more || self.pending.len() >= self.high_water {
            self.flush_pending()?;
        }
        Ok(buf.len())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_pending()
    }
}

impl<S> fmt::Debug for Transport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("buffered", &self.reader.buffer().len())
            .field("pending", &self.pending.len())
            .field("high_water", &self.high_water)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[derive(Default)]
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        flushes: usize,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn more_hint_holds_bytes_back() {
        let mut transport = Transport::new(Duplex::default());
        transport.write(b"GET / ", true).unwrap();
        assert!(transport.get_ref().output.is_empty());
        assert_eq!(transport.pending(), b"GET / ");

        transport.write(b"HTTP/1.1\r\n", false).unwrap();
        assert_eq!(transport.get_ref().output, b"GET / HTTP/1.1\r\n");
        assert_eq!(transport.get_ref().flushes, 1);
        assert!(transport.pending().is_empty());
    }

    #[test]
    fn high_water_forces_flush() {
        let mut transport = Transport::with_capacity(64, 4, Duplex::default());
        transport.write(b"abcdef", true).unwrap();
        assert_eq!(transport.get_ref().output, b"abcdef");
    }

    #[test]
    fn buffered_exposes_unconsumed_input() {
        let duplex = Duplex {
            input: Cursor::new(b"line\r\nrest".to_vec()),
            ..Duplex::default()
        };
        let mut transport = Transport::new(duplex);
        let mut line = String::new();
        transport.read_line(&mut line).unwrap();
        assert_eq!(line, "line\r\n");
        assert_eq!(transport.buffered(), b"rest");
    }
}
