//! Connection establishment
//!
//! [`connect_any`] walks the resolver's candidates in order and returns the
//! first one that both connects and survives the transport-specific
//! establish step. [`Connector`] packages that loop per transport.

mod connector;
mod establish;
#[cfg(feature = "tls")]
mod tls;

pub use connector::{Connector, PlainConnector};
pub use establish::connect_any;
#[cfg(feature = "tls")]
pub use tls::{TlsConnector, TlsStream};
