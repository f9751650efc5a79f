//! HTTP/1.1 request/response cycle over one transport

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
#[cfg(feature = "tls")]
use std::path::Path;

use bytes::BytesMut;
use http::{Method, StatusCode};

use super::framing::{Framing, Inbound, Outbound};
use crate::config::{HttpConfig, Validator};
#[cfg(feature = "tls")]
use crate::connect::{TlsConnector, TlsStream};
use crate::connect::{Connector, PlainConnector};
use crate::error::{self, TrailersUnsupported};
use crate::http::{RequestHead, ResponseHead};
#[cfg(feature = "gzip")]
use crate::stream::GzipLayer;
use crate::stream::chunked::expect_crlf;
use crate::stream::{ChunkedDecoder, ChunkedEncoder, LengthLimit, Sink, Transport, read_delimited};

pub type PlainConnection = HttpConnection<TcpStream>;
#[cfg(feature = "tls")]
pub type SecureConnection = HttpConnection<TlsStream>;

/// Where a connection is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No request in flight, or the last response body has been read to its end.
    Idle,
    /// Request head flushed; body writes use the outbound transform fixed then.
    RequestSent,
    /// The response head has been asked for but not parsed yet.
    HeadersPending,
    /// Response head parsed and the inbound transform stack fixed.
    HeadersParsed,
    BodyStreaming,
}

/// One HTTP/1.1 connection, used by a single caller at a time.
///
/// [`request`](Self::request) sends a head; body bytes then go through
/// [`write`](Self::write) and [`finish`](Self::finish). The response head is
/// parsed lazily, at most once per request, on the first call to
/// [`response_headers`](Self::response_headers) or [`read`](Self::read).
///
/// Without a `Content-Length` on the request, body writes are chunk-encoded;
/// callers streaming such a body declare `Transfer-Encoding: chunked`
/// themselves.
pub struct HttpConnection<S> {
    transport: Transport<S>,
    config: HttpConfig,
    outbound: Option<Outbound>,
    inbound: Option<Inbound>,
    // doubles as the "headers read" flag
    response: Option<ResponseHead>,
    head_request: bool,
    state: ConnectionState,
}

impl HttpConnection<TcpStream> {
    /// Connects over plain TCP with the default configuration.
    pub fn open(host: &str, port: u16) -> crate::Result<Self> {
        let config = HttpConfig::default();
        let connector = PlainConnector::new(config.tcp.clone());
        Self::with_connector(&connector, host, port, config)
    }
}

#[cfg(feature = "tls")]
impl HttpConnection<TlsStream> {
    /// Connects over TLS, trusting `ca_file` if given and the platform store otherwise.
    pub fn open_secure(host: &str, port: u16, ca_file: Option<&Path>) -> crate::Result<Self> {
        let mut config = HttpConfig::default();
        if let Some(ca_file) = ca_file {
            config.tls = config.tls.with_ca_file(ca_file);
        }
        let connector = TlsConnector::new(config.tcp.clone(), &config.tls)?;
        Self::with_connector(&connector, host, port, config)
    }
}

impl<S: Read + Write> HttpConnection<S> {
    pub fn with_connector<C>(connector: &C, host: &str, port: u16, config: HttpConfig) -> crate::Result<Self>
    where
        C: Connector<Stream = S> + ?Sized,
    {
        config.validate()?;
        let stream = connector.connect(host, port)?;
        Self::from_stream(stream, config)
    }

    /// Wraps an already connected stream; `config` is validated first.
    pub fn from_stream(stream: S, config: HttpConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            transport: Transport::with_capacity(config.read_buffer_size, config.write_high_water, stream),
            config,
            outbound: None,
            inbound: None,
            response: None,
            head_request: false,
            state: ConnectionState::Idle,
        })
    }

    /// Sends a request head and fixes the outbound transform for its body.
    ///
    /// Adds `Accept-Encoding: gzip` when gzip support is built in, enabled in
    /// the configuration and the caller has not already listed it. Clears any
    /// cached response so the next read parses a fresh head.
    pub fn request(&mut self, head: &mut RequestHead) -> crate::Result<()> {
        #[cfg(feature = "gzip")]
        if self.config.compression.request_gzip && !head.headers.find_token("Accept-Encoding", "gzip") {
            head.headers.append("Accept-Encoding", "gzip");
        }

        let mut encoded = BytesMut::with_capacity(256);
        head.encode(&mut encoded)?;

        let outbound = if head.headers.contains("Content-Length") {
            Outbound::Direct
        } else {
            Outbound::Chunked(ChunkedEncoder::new())
        };
        tracing::debug!(
            method = %head.method,
            target = %head.target,
            chunked = matches!(outbound, Outbound::Chunked(_)),
            "sending request"
        );

        self.outbound = None;
        self.inbound = None;
        self.response = None;
        self.head_request = head.method == Method::HEAD;

        Sink::write(&mut self.transport, &encoded, false)?;
        self.outbound = Some(outbound);
        self.state = ConnectionState::RequestSent;
        Ok(())
    }

    /// The response head, parsed from the transport on the first call only.
    pub fn response_headers(&mut self) -> crate::Result<&ResponseHead> {
        let head = match self.response.take() {
            Some(head) => head,
            None => self.read_response_head()?,
        };
        Ok(self.response.insert(head))
    }

    /// Reads response body bytes; `Ok(0)` is the end of the body.
    pub fn read(&mut self, buf: &mut [u8]) -> crate::Result<usize> {
        self.response_headers()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let Some(inbound) = self.inbound.as_mut() else {
            return Ok(0);
        };
        let n = inbound.read(&mut self.transport, buf)?;
        if n > 0 {
            self.state = ConnectionState::BodyStreaming;
            return Ok(n);
        }

        if inbound.is_chunked() {
            // the decoder stops after `0\r\n`; only an empty trailer section may follow
            let ended = expect_crlf(&mut self.transport);
            // the body is over either way; nothing more is read for this response
            inbound.exhaust();
            ended.map_err(|err| match err.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                    error::protocol(TrailersUnsupported)
                }
                _ => err.into(),
            })?;
        }
        self.state = ConnectionState::Idle;
        Ok(0)
    }

    /// Writes request body bytes through the outbound transform.
    ///
    /// `more` signals that further data follows right away.
    pub fn write(&mut self, buf: &[u8], more: bool) -> crate::Result<usize> {
        let outbound = self.outbound.as_mut().ok_or_else(no_request)?;
        Ok(outbound.write(&mut self.transport, buf, more)?)
    }

    /// Ends the request body, emitting the terminating chunk when chunked.
    pub fn finish(&mut self) -> crate::Result<()> {
        let outbound = self.outbound.as_mut().ok_or_else(no_request)?;
        Ok(outbound.finish(&mut self.transport)?)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Inbound bytes read from the transport but not consumed by any response.
    pub fn buffered(&self) -> &[u8] {
        self.transport.buffered()
    }

    pub fn get_ref(&self) -> &S {
        self.transport.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.transport.get_mut()
    }

    /// Returns the stream; buffered bytes in either direction are lost.
    pub fn into_inner(self) -> S {
        self.transport.into_inner()
    }

    fn read_response_head(&mut self) -> crate::Result<ResponseHead> {
        if self.outbound.is_none() {
            return Err(no_request());
        }
        self.state = ConnectionState::HeadersPending;

        let head = loop {
            let block = read_delimited(&mut self.transport, b"\r\n\r\n", self.config.max_header_bytes)?;
            let head = ResponseHead::parse(&block)?;
            if head.status.is_informational() && head.status != StatusCode::SWITCHING_PROTOCOLS {
                tracing::trace!(status = %head.status, "skipping interim response");
                continue;
            }
            break head;
        };

        self.inbound = Some(self.select_inbound(&head)?);
        self.state = ConnectionState::HeadersParsed;
        tracing::debug!(status = %head.status, "response head parsed");
        Ok(head)
    }

    fn select_inbound(&self, head: &ResponseHead) -> crate::Result<Inbound> {
        let headers = &head.headers;
        let framing = if head.status == StatusCode::SWITCHING_PROTOCOLS {
            Framing::Eof
        } else if self.head_request || head.is_bodiless() {
            Framing::Length(LengthLimit::new(0))
        } else if headers.find_token("Transfer-Encoding", "chunked") {
            Framing::Chunked(ChunkedDecoder::new())
        } else if let Some(length) = headers.content_length()? {
            Framing::Length(LengthLimit::new(length))
        } else {
            Framing::Eof
        };

        #[cfg_attr(not(feature = "gzip"), allow(unused_mut))]
        let mut inbound = Inbound::new(framing);

        #[cfg(feature = "gzip")]
        if headers.find_token("Content-Encoding", "gzip") && !inbound.framing.is_empty() {
            inbound.gzip = Some(GzipLayer::new());
        }

        tracing::trace!(framing = ?inbound.framing, "response framing selected");
        Ok(inbound)
    }
}

fn no_request() -> crate::Error {
    error::builder("no request has been sent on this connection")
}

impl<S: Read + Write> Read for HttpConnection<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        HttpConnection::read(self, buf).map_err(io::Error::from)
    }
}

impl<S: Read + Write> Sink for HttpConnection<S> {
    fn write(&mut self, buf: &[u8], more: bool) -> io::Result<usize> {
        HttpConnection::write(self, buf, more).map_err(io::Error::from)
    }

    fn finish(&mut self) -> io::Result<()> {
        HttpConnection::finish(self).map_err(io::Error::from)
    }
}

impl<S> fmt::Debug for HttpConnection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("state", &self.state)
            .field("transport", &self.transport)
            .field("outbound", &self.outbound)
            .field("inbound", &self.inbound)
            .finish_non_exhaustive()
    }
}
