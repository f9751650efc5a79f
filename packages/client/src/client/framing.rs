//! Per-message transform selection

use std::io::{self, BufRead};

#[cfg(feature = "gzip")]
use crate::stream::GzipLayer;
use crate::stream::{ChunkedDecoder, ChunkedEncoder, LengthLimit, Sink};

/// Where request body writes go, fixed when the request head is sent.
#[derive(Debug)]
pub(crate) enum Outbound {
    Direct,
    Chunked(ChunkedEncoder),
}

impl Outbound {
    pub(crate) fn write<W: Sink + ?Sized>(
        &mut self,
        sink: &mut W,
        buf: &[u8],
        more: bool,
    ) -> io::Result<usize> {
        match self {
            Outbound::Direct => sink.write(buf, more),
            Outbound::Chunked(encoder) => encoder.encode(sink, buf, more),
        }
    }

    pub(crate) fn finish<W: Sink + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        match self {
            Outbound::Direct => sink.finish(),
            Outbound::Chunked(encoder) => encoder.finish(sink),
        }
    }
}

/// Base framing of a response body.
#[derive(Debug)]
pub(crate) enum Framing {
    Chunked(ChunkedDecoder),
    Length(LengthLimit),
    /// Close-delimited: the body ends with the transport.
    Eof,
}

impl Framing {
    pub(crate) fn read<R: BufRead + ?Sized>(&mut self, src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Framing::Chunked(decoder) => decoder.read(src, buf),
            Framing::Length(limit) => limit.read(src, buf),
            Framing::Eof => src.read(buf),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Framing::Length(limit) if limit.is_done())
    }
}

/// Inbound stack for one response: framing, optionally wrapped by gzip.
#[derive(Debug)]
pub(crate) struct Inbound {
    pub(crate) framing: Framing,
    #[cfg(feature = "gzip")]
    pub(crate) gzip: Option<GzipLayer>,
}

impl Inbound {
    pub(crate) fn new(framing: Framing) -> Self {
        Self {
            framing,
            #[cfg(feature = "gzip")]
            gzip: None,
        }
    }

    pub(crate) fn is_chunked(&self) -> bool {
        matches!(self.framing, Framing::Chunked(_))
    }

    /// Reads body bytes; decompression always sees framed bytes, never raw transport.
    pub(crate) fn read<R: BufRead + ?Sized>(&mut self, src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
        #[cfg(feature = "gzip")]
        if let Some(gzip) = self.gzip.as_mut() {
            let framing = &mut self.framing;
            return gzip.read(buf, |chunk| framing.read(&mut *src, chunk));
        }
        self.framing.read(src, buf)
    }

    /// Leaves the stack permanently exhausted.
    pub(crate) fn exhaust(&mut self) {
        self.framing = Framing::Length(LengthLimit::new(0));
        #[cfg(feature = "gzip")]
        {
            self.gzip = None;
        }
    }
}
