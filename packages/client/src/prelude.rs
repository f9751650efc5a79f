//! Spindle Prelude
//!
//! The types most callers need for a request/response cycle or an upgrade server.

pub use crate::client::{ConnectionState, HttpConnection, PlainConnection};
#[cfg(feature = "tls")]
pub use crate::client::SecureConnection;
pub use crate::config::{HttpConfig, ServerConfig};
pub use crate::error::{Error, Result};
pub use crate::http::{HeaderCollection, RequestHead, ResponseHead};
pub use crate::reactor::{Disposition, Pollable, Reactor, Ready};
pub use crate::stream::Sink;
pub use crate::ws::{UpgradeHandler, WebSocketServer};

pub use ::http::{Method, StatusCode, Version};
