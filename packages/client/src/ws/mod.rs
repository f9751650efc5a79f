//! WebSocket upgrade server
//!
//! Accepts connections on a reactor, runs the opening handshake without
//! blocking and hands each upgraded socket to an [`UpgradeHandler`]. Frame
//! encoding is left to the handler.

pub mod handshake;
mod server;

pub use handshake::{HandshakeError, accept_key};
pub use server::{UpgradeHandler, WebSocketServer};
