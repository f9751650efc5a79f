//! Blocking HTTP/1.1 client connection

mod connection;
mod framing;

pub use connection::{ConnectionState, HttpConnection, PlainConnection};
#[cfg(feature = "tls")]
pub use connection::SecureConnection;
