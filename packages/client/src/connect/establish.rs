use std::io;
use std::net::TcpStream;

use socket2::{Socket, TcpKeepalive};

use crate::config::TcpConfig;
use crate::dns::{Candidate, Name, Resolve};
use crate::error::{self, Error, NoAddresses};

/// Connects to the first candidate for `host` that accepts.
///
/// Candidates are tried in resolver order with `port` patched in; those
/// whose family carries no port are skipped without counting as an attempt.
/// Each connected socket is passed to `establish` (a TLS handshake, for
/// instance) and a failure there moves on to the next candidate like a
/// failed connect would. When every attempt fails the error is of kind
/// `Connect` and carries the last attempt's failure as its source.
pub fn connect_any<R, T, F>(
    resolver: &R,
    host: &str,
    port: u16,
    tcp: &TcpConfig,
    mut establish: F,
) -> crate::Result<T>
where
    R: Resolve + ?Sized,
    F: FnMut(TcpStream) -> crate::Result<T>,
{
    let candidates = resolver
        .resolve(&Name::from(host))
        .map_err(error::connect)?;

    let mut last_error: Option<Error> = None;
    for candidate in &candidates {
        let Some(candidate) = candidate.with_port(port) else {
            tracing::trace!(host, domain = ?candidate.domain, "skipping candidate without IP family");
            continue;
        };
        let addr = candidate.addr.as_socket();

        match open(&candidate, tcp)
            .map_err(Error::from)
            .and_then(&mut establish)
        {
            Ok(stream) => {
                tracing::info!(host, port, ?addr, "connection established");
                return Ok(stream);
            }
            Err(err) => {
                tracing::debug!(host, ?addr, error = %err, "candidate failed");
                last_error = Some(err);
            }
        }
    }

    Err(match last_error {
        Some(err) => error::connect(err),
        None => error::connect(NoAddresses),
    })
}

fn open(candidate: &Candidate, tcp: &TcpConfig) -> io::Result<TcpStream> {
    let socket = Socket::new(candidate.domain, candidate.ty, candidate.protocol)?;
    if tcp.keepalive {
        socket.set_keepalive(true)?;
        if let Some(idle) = tcp.keepalive_idle {
            socket.set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
        }
    }
    if tcp.nodelay {
        socket.set_tcp_nodelay(true)?;
    }

    match tcp.connect_timeout {
        Some(timeout) => socket.connect_timeout(&candidate.addr, timeout)?,
        None => socket.connect(&candidate.addr)?,
    }
    Ok(socket.into())
}
