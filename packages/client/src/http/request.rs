use bytes::{BufMut, BytesMut};
use http::{Method, Version};

use super::headers::HeaderCollection;
use crate::error::{self, MalformedHead};

const MAX_PARSED_HEADERS: usize = 100;

/// Request line plus header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub target: String,
    pub version: Version,
    pub headers: HeaderCollection,
}

impl RequestHead {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: Version::HTTP_11,
            headers: HeaderCollection::new(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Serializes the request line, headers and terminating blank line.
    pub fn encode(&self, out: &mut BytesMut) -> crate::Result<()> {
        if self.target.is_empty() || self.target.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(error::builder(format!(
                "invalid request target {:?}",
                self.target
            )));
        }
        self.headers.validate()?;
        let version = version_str(self.version)?;

        out.reserve(self.method.as_str().len() + self.target.len() + 16);
        out.put_slice(self.method.as_str().as_bytes());
        out.put_u8(b' ');
        out.put_slice(self.target.as_bytes());
        out.put_u8(b' ');
        out.put_slice(version.as_bytes());
        out.put_slice(b"\r\n");
        self.headers.encode(out);
        out.put_slice(b"\r\n");
        Ok(())
    }

    /// Parses a complete header block, as isolated by `read_delimited`.
    pub fn parse(block: &[u8]) -> crate::Result<Self> {
        let mut fields = [httparse::EMPTY_HEADER; MAX_PARSED_HEADERS];
        let mut req = httparse::Request::new(&mut fields);
        if req.parse(block)?.is_partial() {
            return Err(error::protocol(MalformedHead));
        }

        let method = req
            .method
            .ok_or_else(|| error::protocol(MalformedHead))
            .and_then(|m| Method::from_bytes(m.as_bytes()).map_err(error::protocol))?;
        let target = req.path.ok_or_else(|| error::protocol(MalformedHead))?;
        let version = match req.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            _ => return Err(error::protocol(MalformedHead)),
        };

        Ok(Self {
            method,
            target: target.to_owned(),
            version,
            headers: collect_headers(req.headers),
        })
    }
}

pub(crate) fn version_str(version: Version) -> crate::Result<&'static str> {
    match version {
        Version::HTTP_10 => Ok("HTTP/1.0"),
        Version::HTTP_11 => Ok("HTTP/1.1"),
        other => Err(error::builder(format!("unsupported HTTP version {other:?}"))),
    }
}

pub(crate) fn collect_headers(fields: &[httparse::Header<'_>]) -> HeaderCollection {
    let mut headers = HeaderCollection::with_capacity(fields.len());
    for field in fields {
        headers.append(field.name, String::from_utf8_lossy(field.value).into_owned());
    }
    headers
}
