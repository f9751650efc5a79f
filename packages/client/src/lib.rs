//! # Spindle client core
//!
//! Blocking HTTP/1.1 client connections and a readiness-driven WebSocket
//! upgrade server, built from small composable byte-stream transforms.
//!
//! ## Features
//!
//! - **Chunked, length-bounded and close-delimited** body framing
//! - **Gzip response decoding** layered above the framing (`gzip` feature)
//! - **Rustls TLS** with platform or file-based trust anchors (`tls` feature)
//! - **Connection fallback** across every resolved address
//! - **Lazy response parsing**, done at most once per request
//! - **WebSocket opening handshake** driven by a `mio` reactor
//!
//! ## Usage
//!
//! ```no_run
//! use std::io::Read;
//!
//! use spindle_client::prelude::*;
//!
//! fn main() -> spindle_client::Result<()> {
//!     let mut conn = HttpConnection::open("example.com", 80)?;
//!     let mut request = RequestHead::get("/").header("Host", "example.com");
//!     conn.request(&mut request)?;
//!
//!     println!("status: {}", conn.response_headers()?.status);
//!     let mut body = Vec::new();
//!     conn.read_to_end(&mut body)?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod connect;
pub mod dns;
pub mod error;
pub mod http;
pub mod reactor;
pub mod stream;
#[cfg(feature = "tls")]
pub mod tls;
pub mod ws;

pub mod prelude;

pub use crate::error::{Error, Result};
pub use crate::prelude::*;
