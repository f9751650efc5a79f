use std::io::{Read, Write};
use std::net::TcpStream;

use super::connect_any;
use crate::config::TcpConfig;
use crate::dns::{GaiResolver, Resolve};

/// Produces a connected, ready-to-use byte stream for a host and port.
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self, host: &str, port: u16) -> crate::Result<Self::Stream>;
}

/// Plain TCP.
#[derive(Debug, Clone, Default)]
pub struct PlainConnector<R = GaiResolver> {
    resolver: R,
    tcp: TcpConfig,
}

impl PlainConnector<GaiResolver> {
    pub fn new(tcp: TcpConfig) -> Self {
        Self::with_resolver(GaiResolver::new(), tcp)
    }
}

impl<R: Resolve> PlainConnector<R> {
    pub fn with_resolver(resolver: R, tcp: TcpConfig) -> Self {
        Self { resolver, tcp }
    }
}

impl<R: Resolve> Connector for PlainConnector<R> {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16) -> crate::Result<TcpStream> {
        connect_any(&self.resolver, host, port, &self.tcp, Ok)
    }
}
