//! Streaming gzip decoding over a framed body

use std::io::{self, Write};

use flate2::write::GzDecoder;

const INPUT_CHUNK: usize = 8 * 1024;

/// Decompressed bytes held before the layer stops feeding input.
const MAX_PENDING: usize = 64 * 1024;

/// Push-based gzip decoder sitting above body framing.
///
/// Framed bytes are pulled through a caller-supplied closure, so the layer
/// never owns the framing below it. Decoder failures surface as
/// `InvalidData` errors wrapping a decode-kind [`crate::Error`]; errors from
/// the closure pass through untouched.
///
/// Compressed input is fed in slices and feeding pauses once
/// [`MAX_PENDING`] decompressed bytes are waiting, so a highly compressible
/// body never inflates into memory ahead of the reader.
pub struct GzipLayer {
    decoder: GzDecoder<Vec<u8>>,
    out_pos: usize,
    input_done: bool,
    scratch: Box<[u8]>,
    // unconsumed compressed bytes are scratch[input_pos..input_len]
    input_pos: usize,
    input_len: usize,
}

impl Default for GzipLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipLayer {
    pub fn new() -> Self {
        Self {
            decoder: GzDecoder::new(Vec::new()),
            out_pos: 0,
            input_done: false,
            scratch: vec![0u8; INPUT_CHUNK].into_boxed_slice(),
            input_pos: 0,
            input_len: 0,
        }
    }

    /// Reads decompressed bytes, pulling framed input from `fill` as needed.
    ///
    /// `fill` returning `Ok(0)` marks the end of the compressed stream; a
    /// gzip member cut short at that point is a decode error.
    pub fn read<F>(&mut self, buf: &mut [u8], mut fill: F) -> io::Result<usize>
    where
        F: FnMut(&mut [u8]) -> io::Result<usize>,
    {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let decoded = self.decoder.get_ref();
            let pending = &decoded[self.out_pos..];
            if !pending.is_empty() {
                let n = pending.len().min(buf.len());
                buf[..n].copy_from_slice(&pending[..n]);
                self.out_pos += n;
                if self.out_pos == self.decoder.get_ref().len() {
                    self.decoder.get_mut().clear();
                    self.out_pos = 0;
                }
                return Ok(n);
            }

            if self.input_pos < self.input_len {
                self.feed()?;
                continue;
            }

            if self.input_done {
                return Ok(0);
            }

            let n = fill(&mut self.scratch[..])?;
            if n == 0 {
                self.input_done = true;
                self.decoder.try_finish().map_err(decode_error)?;
                continue;
            }
            self.input_pos = 0;
            self.input_len = n;
            self.feed()?;
        }
    }

    fn feed(&mut self) -> io::Result<()> {
        while self.input_pos < self.input_len {
            let input = &self.scratch[self.input_pos..self.input_len];
            let written = self.decoder.write(input).map_err(decode_error)?;
            if written == 0 {
                return Err(decode_error(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "trailing data after gzip stream",
                )));
            }
            self.input_pos += written;
            // move decompressed output out of flate2's internal buffer
            self.decoder.flush().map_err(decode_error)?;
            if self.pending() >= MAX_PENDING {
                break;
            }
        }
        Ok(())
    }

    fn pending(&self) -> usize {
        self.decoder.get_ref().len() - self.out_pos
    }
}

fn decode_error(err: io::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, crate::error::decode(err))
}

impl std::fmt::Debug for GzipLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipLayer")
            .field("buffered", &self.pending())
            .field("input_done", &self.input_done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn inflate(compressed: Vec<u8>) -> io::Result<Vec<u8>> {
        let mut src = Cursor::new(compressed);
        let mut layer = GzipLayer::new();
        let mut out = Vec::new();
        let mut buf = [0u8; 7];
        loop {
            let n = layer.read(&mut buf, |chunk| src.read(chunk))?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn inflates_small_reads() {
        let body = b"hello gzip world, hello gzip world".repeat(50);
        assert_eq!(inflate(gzip(&body)).unwrap(), body);
    }

    #[test]
    fn buffered_output_stays_bounded() {
        let body = vec![0u8; 8 * 1024 * 1024];
        let compressed = gzip(&body);
        let mut src = Cursor::new(compressed.clone());
        let mut layer = GzipLayer::new();

        let mut buf = [0u8; 16];
        assert_eq!(layer.read(&mut buf, |chunk| src.read(chunk)).unwrap(), 16);
        assert!(layer.pending() < 256 * 1024, "buffered {}", layer.pending());
        assert!(layer.decoder.get_ref().capacity() < 1024 * 1024);

        assert_eq!(inflate(compressed).unwrap(), body);
    }

    #[test]
    fn truncated_stream_is_decode_error() {
        let mut compressed = gzip(b"some payload that will be cut");
        compressed.truncate(compressed.len() - 6);
        let err = inflate(compressed).unwrap_err();
        let err = crate::Error::from(err);
        assert!(err.is_decode());
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = inflate(b"definitely not gzip".to_vec()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(crate::Error::from(err).is_decode());
    }

    #[test]
    fn framing_errors_pass_through() {
        let mut layer = GzipLayer::new();
        let mut buf = [0u8; 8];
        let err = layer
            .read(&mut buf, |_| {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "framing"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(err.get_ref().is_some_and(|e| !e.is::<crate::Error>()));
    }
}
