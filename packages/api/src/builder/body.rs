//! Body configuration methods

use bytes::Bytes;

use super::core::RequestBuilder;

impl RequestBuilder {
    /// Set the request body; it is sent with a `Content-Length`
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a text body and `Content-Type: text/plain` unless one is already set
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        if !self.headers.contains("Content-Type") {
            self.headers.append("Content-Type", "text/plain; charset=utf-8");
        }
        self.body = Some(Bytes::from(body.into()));
        self
    }
}
