use std::io::{self, Read};

use super::incomplete;

/// Caps a body at a known byte count.
///
/// Reads never pull more than the remaining count out of the source, so
/// bytes belonging to the next message stay buffered below this layer.
#[derive(Debug, Clone, Copy)]
pub struct LengthLimit {
    remaining: u64,
}

impl LengthLimit {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    pub fn read<R: Read + ?Sized>(&mut self, src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let n = src.read(&mut buf[..max])?;
        if n == 0 {
            return Err(incomplete());
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Cursor};

    use super::*;

    #[test]
    fn stops_at_limit_and_leaves_rest() {
        let mut src = BufReader::new(Cursor::new(b"helloEXTRA".to_vec()));
        let mut limit = LengthLimit::new(5);
        let mut buf = [0u8; 64];

        assert_eq!(limit.read(&mut src, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(limit.read(&mut src, &mut buf).unwrap(), 0);
        assert_eq!(src.fill_buf().unwrap(), b"EXTRA");
    }

    #[test]
    fn early_eof_is_an_error() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut limit = LengthLimit::new(10);
        let mut buf = [0u8; 64];
        assert_eq!(limit.read(&mut src, &mut buf).unwrap(), 3);
        let err = limit.read(&mut src, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(limit.remaining(), 7);
    }

    #[test]
    fn zero_length_reads_nothing() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut limit = LengthLimit::new(0);
        let mut buf = [0u8; 4];
        assert_eq!(limit.read(&mut src, &mut buf).unwrap(), 0);
        assert_eq!(src.position(), 0);
    }
}
