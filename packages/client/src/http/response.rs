use bytes::{BufMut, BytesMut};
use http::{StatusCode, Version};

use super::headers::HeaderCollection;
use super::request::{collect_headers, version_str};
use crate::error::{self, MalformedHead};

const MAX_PARSED_HEADERS: usize = 100;

/// Status line plus header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub reason: String,
    pub version: Version,
    pub headers: HeaderCollection,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
            version: Version::HTTP_11,
            headers: HeaderCollection::new(),
        }
    }

    /// Parses a complete header block, as isolated by `read_delimited`.
    pub fn parse(block: &[u8]) -> crate::Result<Self> {
        let mut fields = [httparse::EMPTY_HEADER; MAX_PARSED_HEADERS];
        let mut res = httparse::Response::new(&mut fields);
        if res.parse(block)?.is_partial() {
            return Err(error::protocol(MalformedHead));
        }

        let code = res.code.ok_or_else(|| error::protocol(MalformedHead))?;
        let status = StatusCode::from_u16(code).map_err(error::protocol)?;
        let version = match res.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            _ => return Err(error::protocol(MalformedHead)),
        };

        Ok(Self {
            status,
            reason: res.reason.unwrap_or_default().to_owned(),
            version,
            headers: collect_headers(res.headers),
        })
    }

    pub fn encode(&self, out: &mut BytesMut) -> crate::Result<()> {
        self.headers.validate()?;
        let version = version_str(self.version)?;

        out.put_slice(version.as_bytes());
        out.put_u8(b' ');
        out.put_slice(self.status.as_str().as_bytes());
        out.put_u8(b' ');
        out.put_slice(self.reason.as_bytes());
        out.put_slice(b"\r\n");
        self.headers.encode(out);
        out.put_slice(b"\r\n");
        Ok(())
    }

    /// Whether the status forbids a message body regardless of framing headers.
    pub fn is_bodiless(&self) -> bool {
        self.status.is_informational()
            || self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::NOT_MODIFIED
    }
}
