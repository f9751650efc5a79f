//! HTTP/1.1 chunked transfer coding

use std::fmt::Write as _;
use std::io::{self, BufRead, Read};

use bytes::BytesMut;

use super::{Sink, incomplete};

/// Longest accepted chunk-size line, extensions included.
const MAX_SIZE_LINE: u64 = 1024;

/// Frames each write as one chunk: `<hex-size>\r\n<data>\r\n`.
///
/// Empty writes produce no chunk, since a zero-size chunk terminates the body.
#[derive(Debug, Default)]
pub struct ChunkedEncoder {
    finished: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn encode<W: Sink + ?Sized>(
        &mut self,
        sink: &mut W,
        buf: &[u8],
        more: bool,
    ) -> io::Result<usize> {
        if self.finished {
            return Err(io::Error::other("chunked body already finished"));
        }
        if buf.is_empty() {
            if !more {
                sink.write(&[], false)?;
            }
            return Ok(0);
        }

        let mut head = BytesMut::with_capacity(18);
        // formatting into BytesMut cannot fail
        let _ = write!(head, "{:x}\r\n", buf.len());

        sink.write(&head, true)?;
        sink.write(buf, true)?;
        sink.write(b"\r\n", more)?;
        Ok(buf.len())
    }

    /// Emits the terminating `0\r\n\r\n` and finishes the sink.
    pub fn finish<W: Sink + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        if !self.finished {
            sink.write(b"0\r\n\r\n", false)?;
            self.finished = true;
        }
        sink.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    Data(u64),
    DataEnd,
    Done,
}

/// Decodes a chunked body from a buffered source.
///
/// Decoding stops right after the `0\r\n` size line. Whatever follows, the
/// blank line or trailer fields, is left in the source for the caller.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkState,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self {
            state: ChunkState::Size,
        }
    }

    /// True once the terminating zero-size chunk has been read.
    pub fn is_done(&self) -> bool {
        self.state == ChunkState::Done
    }

    pub fn read<R: BufRead + ?Sized>(&mut self, src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match self.state {
                ChunkState::Done => return Ok(0),
                ChunkState::Size => {
                    let size = read_size_line(src)?;
                    tracing::trace!(size, "chunk header");
                    self.state = if size == 0 {
                        ChunkState::Done
                    } else {
                        ChunkState::Data(size)
                    };
                }
                ChunkState::Data(remaining) => {
                    let available = src.fill_buf()?;
                    if available.is_empty() {
                        return Err(incomplete());
                    }
                    let want = usize::try_from(remaining).unwrap_or(usize::MAX);
                    let n = available.len().min(buf.len()).min(want);
                    buf[..n].copy_from_slice(&available[..n]);
                    src.consume(n);

                    let left = remaining - n as u64;
                    self.state = if left == 0 {
                        ChunkState::DataEnd
                    } else {
                        ChunkState::Data(left)
                    };
                    return Ok(n);
                }
                ChunkState::DataEnd => {
                    expect_crlf(src)?;
                    self.state = ChunkState::Size;
                }
            }
        }
    }
}

fn read_size_line<R: BufRead + ?Sized>(src: &mut R) -> io::Result<u64> {
    let mut line = Vec::with_capacity(16);
    let n = Read::take(&mut *src, MAX_SIZE_LINE).read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(incomplete());
    }
    if !line.ends_with(b"\n") {
        if n as u64 >= MAX_SIZE_LINE {
            return Err(invalid("chunk size line too long"));
        }
        return Err(incomplete());
    }

    let line = line
        .strip_suffix(b"\r\n")
        .ok_or_else(|| invalid("chunk size line not terminated by CRLF"))?;
    // extensions after ';' are ignored
    let digits = line.split(|&b| b == b';').next().unwrap_or_default();
    let digits = digits.trim_ascii();

    if digits.is_empty() || digits.len() > 16 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid("invalid chunk size"));
    }
    let digits = std::str::from_utf8(digits).map_err(|_| invalid("invalid chunk size"))?;
    u64::from_str_radix(digits, 16).map_err(|_| invalid("invalid chunk size"))
}

/// Consumes exactly one CRLF, failing on anything else.
pub(crate) fn expect_crlf<R: Read + ?Sized>(src: &mut R) -> io::Result<()> {
    let mut crlf = [0u8; 2];
    src.read_exact(&mut crlf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            incomplete()
        } else {
            err
        }
    })?;
    if crlf != *b"\r\n" {
        return Err(invalid("expected CRLF"));
    }
    Ok(())
}

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use super::*;

    fn decode_all(input: &[u8]) -> io::Result<Vec<u8>> {
        let mut src = Cursor::new(input.to_vec());
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = decoder.read(&mut src, &mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn encoder_frames_each_write() {
        let mut out = Vec::new();
        let mut encoder = ChunkedEncoder::new();
        encoder.encode(&mut out, b"hello", true).unwrap();
        encoder.encode(&mut out, b"", true).unwrap();
        encoder.encode(&mut out, b"abcdefghijklmnopq", false).unwrap();
        encoder.finish(&mut out).unwrap();
        assert_eq!(
            out,
            b"5\r\nhello\r\n11\r\nabcdefghijklmnopq\r\n0\r\n\r\n".as_slice()
        );
    }

    #[test]
    fn encoder_rejects_writes_after_finish() {
        let mut out = Vec::new();
        let mut encoder = ChunkedEncoder::new();
        encoder.finish(&mut out).unwrap();
        encoder.finish(&mut out).unwrap();
        assert_eq!(out, b"0\r\n\r\n");
        assert!(encoder.encode(&mut out, b"x", false).is_err());
    }

    #[test]
    fn decoder_stops_at_zero_chunk() {
        let mut src = BufReader::new(Cursor::new(b"3\r\nabc\r\n0\r\n\r\n".to_vec()));
        let mut decoder = ChunkedDecoder::new();
        let mut buf = [0u8; 16];
        assert_eq!(decoder.read(&mut src, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(decoder.read(&mut src, &mut buf).unwrap(), 0);
        assert!(decoder.is_done());
        assert_eq!(src.buffer(), b"\r\n");
    }

    #[test]
    fn decoder_ignores_extensions_and_case() {
        let out = decode_all(b"A;name=value\r\n0123456789\r\n0\r\n").unwrap();
        assert_eq!(out, b"0123456789");
    }

    #[test]
    fn decoder_rejects_bad_size() {
        let err = decode_all(b"zz\r\nabc\r\n0\r\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err = decode_all(b"+3\r\nabc\r\n0\r\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn decoder_rejects_missing_data_crlf() {
        let err = decode_all(b"3\r\nabcX\r\n0\r\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn decoder_reports_truncation() {
        let err = decode_all(b"5\r\nab").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let err = decode_all(b"").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn decoder_bounds_size_line() {
        let mut input = vec![b'0'; 2048];
        input.extend_from_slice(b"\r\n");
        let err = decode_all(&input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
