//! Ordered, case-insensitive header collection

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{self, InvalidContentLength};

/// Ordered multimap of header fields.
///
/// Names compare case-insensitively; the spelling and order of insertion are
/// kept for serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<(String, String)>,
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether any value of `name`, read as a comma-separated list, holds `token`.
    ///
    /// Tokens are trimmed and compared case-insensitively, so
    /// `Connection: keep-alive, Upgrade` contains `upgrade`.
    pub fn find_token(&self, name: &str, token: &str) -> bool {
        self.get_all(name)
            .flat_map(|value| value.split(','))
            .any(|item| item.trim().eq_ignore_ascii_case(token))
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces every value of `name` with `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Removes every value of `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parses `Content-Length`, requiring every copy to agree.
    pub fn content_length(&self) -> crate::Result<Option<u64>> {
        let mut length = None;
        for value in self.get_all("Content-Length") {
            let value = value.trim();
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(error::protocol(InvalidContentLength));
            }
            let parsed: u64 = value
                .parse()
                .map_err(|_| error::protocol(InvalidContentLength))?;
            match length {
                Some(seen) if seen != parsed => {
                    return Err(error::protocol(InvalidContentLength));
                }
                _ => length = Some(parsed),
            }
        }
        Ok(length)
    }

    /// Rejects names and values that would corrupt the header block.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in &self.entries {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(error::builder(format!("invalid header name {name:?}")));
            }
            if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
                return Err(error::builder(format!("invalid value for header {name}")));
            }
        }
        Ok(())
    }

    /// Serializes as `Name: value\r\n` lines, without the closing blank line.
    pub fn encode(&self, out: &mut BytesMut) {
        for (name, value) in &self.entries {
            out.reserve(name.len() + value.len() + 4);
            out.put_slice(name.as_bytes());
            out.put_slice(b": ");
            out.put_slice(value.as_bytes());
            out.put_slice(b"\r\n");
        }
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderCollection {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl<N: Into<String>, V: Into<String>> Extend<(N, V)> for HeaderCollection {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderCollection::new();
        headers.append("Content-Type", "text/plain");
        headers.append("set-cookie", "a=1");
        headers.append("Set-Cookie", "b=2");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get_all("SET-COOKIE").collect::<Vec<_>>(), ["a=1", "b=2"]);
        assert!(!headers.contains("Accept"));
    }

    #[test]
    fn value_outlives_lookup_name() {
        let headers: HeaderCollection = [("Host", "example.com")].into_iter().collect();
        let value = {
            let name = String::from("host");
            headers.get(&name)
        };
        assert_eq!(value, Some("example.com"));
    }

    #[test]
    fn token_search_splits_and_trims() {
        let headers: HeaderCollection = [
            ("Transfer-Encoding", "gzip"),
            ("transfer-encoding", " Chunked "),
            ("Connection", "keep-alive,Upgrade"),
        ]
        .into_iter()
        .collect();

        assert!(headers.find_token("Transfer-Encoding", "chunked"));
        assert!(headers.find_token("connection", "upgrade"));
        assert!(!headers.find_token("Connection", "close"));
        assert!(!headers.find_token("Accept-Encoding", "gzip"));
    }

    #[test]
    fn insert_replaces_all_values() {
        let mut headers = HeaderCollection::new();
        headers.append("Accept", "a");
        headers.append("Host", "example.com");
        headers.append("accept", "b");
        headers.insert("ACCEPT", "c");

        assert_eq!(headers.get_all("accept").collect::<Vec<_>>(), ["c"]);
        assert_eq!(headers.remove("host"), 1);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn encode_keeps_order_and_spelling() {
        let headers: HeaderCollection = [("Host", "a"), ("X-Trace", "1"), ("accept", "*/*")]
            .into_iter()
            .collect();
        let mut out = BytesMut::new();
        headers.encode(&mut out);
        assert_eq!(&out[..], b"Host: a\r\nX-Trace: 1\r\naccept: */*\r\n");
    }

    #[test]
    fn content_length_parsing() {
        let mut headers = HeaderCollection::new();
        assert_eq!(headers.content_length().unwrap(), None);

        headers.append("Content-Length", "42");
        headers.append("content-length", " 42");
        assert_eq!(headers.content_length().unwrap(), Some(42));

        headers.append("Content-Length", "43");
        assert!(headers.content_length().unwrap_err().is_protocol());

        headers.insert("Content-Length", "-1");
        assert!(headers.content_length().unwrap_err().is_protocol());
    }

    #[test]
    fn validate_rejects_injection() {
        let mut headers = HeaderCollection::new();
        headers.append("X-Ok", "fine");
        assert!(headers.validate().is_ok());

        headers.append("X-Bad", "a\r\nInjected: yes");
        assert!(headers.validate().unwrap_err().is_builder());

        let mut headers = HeaderCollection::new();
        headers.append("Bad Name", "x");
        assert!(headers.validate().unwrap_err().is_builder());
    }
}
