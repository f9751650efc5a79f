//! Spindle Public API
//!
//! Fluent, blocking HTTP/1.1 requests on top of `spindle_client` connections.
//!
//! ```no_run
//! use spindle::Http;
//!
//! fn main() -> spindle::Result<()> {
//!     let response = Http::get("https://example.com/").send()?;
//!     println!("{}", response.status());
//!     let body = response.bytes()?;
//!     println!("{} bytes", body.len());
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;
pub mod response;

use http::Method;

pub use builder::{ContentType, RequestBuilder};
pub use response::Response;

// Re-export important types from the client package
pub use spindle_client::config::{CompressionConfig, HttpConfig, TcpConfig, TlsConfig, TrustAnchors};
pub use spindle_client::{Error, HeaderCollection, Result, StatusCode};

/// Main entry point providing request builders per method
pub struct Http;

impl Http {
    pub fn get(url: &str) -> RequestBuilder {
        RequestBuilder::new(Method::GET, url)
    }

    pub fn post(url: &str) -> RequestBuilder {
        RequestBuilder::new(Method::POST, url)
    }

    pub fn put(url: &str) -> RequestBuilder {
        RequestBuilder::new(Method::PUT, url)
    }

    pub fn delete(url: &str) -> RequestBuilder {
        RequestBuilder::new(Method::DELETE, url)
    }

    pub fn head(url: &str) -> RequestBuilder {
        RequestBuilder::new(Method::HEAD, url)
    }

    /// Builder for any method
    pub fn request(method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }
}
