//! Header configuration methods

use http::{HeaderName, HeaderValue};
use spindle_client::error;

use super::core::RequestBuilder;

/// Content type enumeration for the common body formats
#[derive(Debug, Clone, Copy)]
pub enum ContentType {
    ApplicationJson,
    ApplicationFormUrlEncoded,
    ApplicationOctetStream,
    TextPlain,
    TextHtml,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
        }
    }
}

impl RequestBuilder {
    /// Append a header; names and values are checked against the HTTP grammar
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = HeaderName::from_bytes(name.as_bytes()) {
            self.fail(error::builder(format!("invalid header name {name:?}: {e}")));
            return self;
        }
        if let Err(e) = HeaderValue::from_str(value) {
            self.fail(error::builder(format!("invalid value for header {name}: {e}")));
            return self;
        }
        self.headers.append(name, value);
        self
    }

    /// Append several headers in order
    #[must_use]
    pub fn headers<'a>(self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Set `Content-Type`, replacing any earlier value
    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.headers.insert("Content-Type", content_type.as_str());
        self
    }
}
