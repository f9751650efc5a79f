use std::io::{self, BufRead};

use super::incomplete;
use crate::error::HeaderTooLarge;

/// Reads up to and including `delimiter`, consuming nothing past it.
///
/// Fails with `InvalidData` once `limit` bytes have been read without finding
/// the delimiter, and with `UnexpectedEof` if the source ends first.
pub fn read_delimited<R: BufRead + ?Sized>(
    src: &mut R,
    delimiter: &[u8],
    limit: usize,
) -> io::Result<Vec<u8>> {
    debug_assert!(!delimiter.is_empty());
    let mut out = Vec::with_capacity(limit.min(1024));

    loop {
        let available = src.fill_buf()?;
        if available.is_empty() {
            return Err(incomplete());
        }

        let mut used = 0;
        let mut found = false;
        for &byte in available {
            out.push(byte);
            used += 1;
            if out.ends_with(delimiter) {
                found = true;
                break;
            }
            if out.len() >= limit {
                break;
            }
        }
        src.consume(used);

        if found {
            return Ok(out);
        }
        if out.len() >= limit {
            return Err(io::Error::new(io::ErrorKind::InvalidData, HeaderTooLarge));
        }
    }
}
