//! Core `RequestBuilder` structure and base functionality

use std::fmt;

use bytes::Bytes;
use http::Method;
use spindle_client::config::HttpConfig;
use spindle_client::{Error, HeaderCollection, error};
use url::Url;

/// Fluent builder for one request
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: Option<Url>,
    pub(crate) headers: HeaderCollection,
    pub(crate) body: Option<Bytes>,
    pub(crate) config: HttpConfig,
    /// First error recorded while building
    pub(crate) error: Option<Error>,
}

impl RequestBuilder {
    pub fn new(method: Method, url: &str) -> Self {
        let (url, error) = match Url::parse(url) {
            Ok(url) => (Some(url), None),
            Err(e) => (None, Some(error::builder(format!("invalid URL {url:?}: {e}")))),
        };
        Self {
            method,
            url,
            headers: HeaderCollection::new(),
            body: None,
            config: HttpConfig::default(),
            error,
        }
    }

    /// Replace the connection configuration
    #[must_use]
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the connection configuration in place
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut HttpConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub(crate) fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(Bytes::len))
            .field("error", &self.error)
            .finish()
    }
}
