//! WebSocket upgrade server that echoes raw bytes back on upgraded connections.
//!
//! ```text
//! RUST_LOG=info cargo run -p spindle --example upgrade_server -- 127.0.0.1:9001
//! ```

use std::io::{self, Read, Write};

use mio::event::Source;
use mio::net::TcpStream;
use mio::{Interest, Token};
use spindle_client::prelude::*;
use tracing_subscriber::EnvFilter;

struct Echo;

impl UpgradeHandler for Echo {
    fn prepare_response_headers(&self, request: &RequestHead, headers: &mut HeaderCollection) {
        if request.headers.find_token("Sec-WebSocket-Protocol", "echo") {
            headers.append("Sec-WebSocket-Protocol", "echo");
        }
    }

    fn client_attached(&self, stream: TcpStream, reactor: &mut Reactor) {
        if let Err(err) = reactor.register(Box::new(EchoConnection { stream }), Interest::READABLE) {
            tracing::warn!(error = %err, "failed to register upgraded connection");
        }
    }
}

struct EchoConnection {
    stream: TcpStream,
}

impl Pollable for EchoConnection {
    fn source(&mut self) -> Option<&mut dyn Source> {
        Some(&mut self.stream)
    }

    fn ready(&mut self, _reactor: &mut Reactor, token: Token, _ready: Ready) -> Disposition {
        let mut buf = [0u8; 4096];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    tracing::info!(?token, "client closed");
                    return Disposition::Remove;
                }
                // small demo payloads; a full socket buffer just drops the connection
                Ok(n) => {
                    if let Err(err) = self.stream.write_all(&buf[..n]) {
                        tracing::warn!(?token, error = %err, "echo failed");
                        return Disposition::Remove;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Disposition::Keep,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!(?token, error = %err, "read failed");
                    return Disposition::Remove;
                }
            }
        }
    }
}

fn main() -> spindle_client::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9001".to_owned())
        .parse::<std::net::SocketAddr>()
        .map_err(spindle_client::error::builder)?;

    let mut reactor = Reactor::new()?;
    let server = WebSocketServer::bind(addr, Echo, ServerConfig::default())?;
    tracing::info!(addr = %server.local_addr()?, "ready for upgrades");
    server.register(&mut reactor)?;
    reactor.run()?;
    Ok(())
}
