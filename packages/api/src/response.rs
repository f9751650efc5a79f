//! Response returned by `RequestBuilder::send`

use std::fmt;
use std::io::{self, Read};

use bytes::Bytes;
use http::{StatusCode, Version};
use spindle_client::{HeaderCollection, HttpConnection, ResponseHead, error};
use url::Url;

use crate::builder::methods::BoxStream;

/// Parsed response head plus the connection streaming its body
pub struct Response {
    url: Url,
    head: ResponseHead,
    conn: HttpConnection<BoxStream>,
}

impl Response {
    pub(crate) fn new(url: Url, head: ResponseHead, conn: HttpConnection<BoxStream>) -> Self {
        Self { url, head, conn }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn version(&self) -> Version {
        self.head.version
    }

    pub fn headers(&self) -> &HeaderCollection {
        &self.head.headers
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Read the rest of the body; gzip bodies arrive decompressed
    pub fn bytes(mut self) -> spindle_client::Result<Bytes> {
        let mut body = Vec::new();
        let mut buf = [0u8; 8 * 1024];
        loop {
            let n = self.conn.read(&mut buf)?;
            if n == 0 {
                return Ok(Bytes::from(body));
            }
            body.extend_from_slice(&buf[..n]);
        }
    }

    /// Read the rest of the body as UTF-8
    pub fn text(self) -> spindle_client::Result<String> {
        let body = self.bytes()?;
        String::from_utf8(body.to_vec()).map_err(error::decode)
    }

    /// Take the underlying connection, e.g. to send another request on it
    pub fn into_connection(self) -> HttpConnection<BoxStream> {
        self.conn
    }
}

impl Read for Response {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut self.conn, buf)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.head.status)
            .field("version", &self.head.version)
            .field("headers", &self.head.headers)
            .finish()
    }
}
