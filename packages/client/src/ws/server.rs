use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::rc::Rc;

use bytes::{Buf, BytesMut};
use mio::event::Source;
use mio::net::{TcpListener, TcpStream};
use mio::{Interest, Token};
use socket2::{Domain, Protocol, Socket, Type};

use super::handshake::{self, HandshakeError};
use crate::config::{ServerConfig, Validator};
use crate::http::{HeaderCollection, RequestHead};
use crate::reactor::{Disposition, Pollable, Reactor, Ready};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";
const READ_CHUNK: usize = 1024;

/// Application side of the upgrade server.
pub trait UpgradeHandler {
    /// Adds headers to a successful `101` response.
    fn prepare_response_headers(&self, request: &RequestHead, headers: &mut HeaderCollection) {
        let _ = (request, headers);
    }

    /// Takes ownership of an upgraded connection.
    ///
    /// The stream is non-blocking and no longer registered; register it on
    /// `reactor` to keep receiving readiness for it.
    fn client_attached(&self, stream: TcpStream, reactor: &mut Reactor);
}

impl<H: UpgradeHandler + ?Sized> UpgradeHandler for Rc<H> {
    fn prepare_response_headers(&self, request: &RequestHead, headers: &mut HeaderCollection) {
        (**self).prepare_response_headers(request, headers);
    }

    fn client_attached(&self, stream: TcpStream, reactor: &mut Reactor) {
        (**self).client_attached(stream, reactor);
    }
}

/// Listening socket that upgrades accepted connections to WebSocket.
pub struct WebSocketServer<H> {
    listener: TcpListener,
    handler: Rc<H>,
    config: ServerConfig,
}

impl<H: UpgradeHandler + 'static> WebSocketServer<H> {
    /// Binds a non-blocking listener.
    ///
    /// IPv6 addresses accept IPv4-mapped clients too unless
    /// `config.dual_stack` is off.
    pub fn bind(addr: SocketAddr, handler: H, config: ServerConfig) -> crate::Result<Self> {
        config.validate()?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        if addr.is_ipv6() {
            socket.set_only_v6(!config.dual_stack)?;
        }
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;
        socket.set_nonblocking(true)?;

        let listener = TcpListener::from_std(socket.into());
        tracing::info!(addr = ?listener.local_addr().ok(), "websocket server listening");
        Ok(Self {
            listener,
            handler: Rc::new(handler),
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Hands the server to `reactor`, which then owns it.
    pub fn register(self, reactor: &mut Reactor) -> io::Result<Token> {
        reactor.register(Box::new(self), Interest::READABLE)
    }
}

impl<H: UpgradeHandler + 'static> Pollable for WebSocketServer<H> {
    fn source(&mut self) -> Option<&mut dyn Source> {
        Some(&mut self.listener)
    }

    fn ready(&mut self, reactor: &mut Reactor, _token: Token, _ready: Ready) -> Disposition {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted");
                    let pending = Handshake::new(
                        stream,
                        peer,
                        Rc::clone(&self.handler),
                        self.config.max_handshake_bytes,
                    );
                    if let Err(err) = reactor.register(Box::new(pending), Interest::READABLE) {
                        tracing::warn!(%peer, error = %err, "failed to register connection");
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Disposition::Keep,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed");
                    return Disposition::Keep;
                }
            }
        }
    }
}

enum Phase {
    AwaitingRequest,
    /// `101` partially written; resumes on writable.
    Responding { response: BytesMut },
}

/// Per-connection handshake progress.
struct Handshake<H> {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    handler: Rc<H>,
    max_bytes: usize,
    received: Vec<u8>,
    phase: Phase,
}

impl<H: UpgradeHandler> Handshake<H> {
    fn new(stream: TcpStream, peer: SocketAddr, handler: Rc<H>, max_bytes: usize) -> Self {
        Self {
            stream: Some(stream),
            peer,
            handler,
            max_bytes,
            received: Vec::with_capacity(READ_CHUNK),
            phase: Phase::AwaitingRequest,
        }
    }

    /// Reads until the socket would block; `Ok(true)` once the peer has closed.
    ///
    /// Keeps at most one byte past the limit, enough to detect an oversized head.
    fn fill(&mut self, stream: &mut TcpStream) -> io::Result<bool> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => return Ok(true),
                Ok(n) => {
                    let room = (self.max_bytes + 1).saturating_sub(self.received.len());
                    self.received.extend_from_slice(&buf[..n.min(room)]);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// `Ok(None)` while the head is still incomplete.
    fn parse(&self) -> Result<Option<RequestHead>, HandshakeError> {
        let end = self
            .received
            .windows(HEAD_TERMINATOR.len())
            .position(|window| window == HEAD_TERMINATOR)
            .map(|pos| pos + HEAD_TERMINATOR.len());

        let Some(end) = end else {
            if self.received.len() >= self.max_bytes {
                return Err(HandshakeError::TooLarge(self.max_bytes));
            }
            return Ok(None);
        };
        if end > self.max_bytes {
            return Err(HandshakeError::TooLarge(self.max_bytes));
        }
        if end < self.received.len() {
            return Err(HandshakeError::EarlyData);
        }

        RequestHead::parse(&self.received[..end])
            .map(Some)
            .map_err(HandshakeError::Malformed)
    }

    fn respond(&self, request: &RequestHead) -> Result<BytesMut, HandshakeError> {
        let key = handshake::validate(request)?;
        let mut response = handshake::switching_protocols(key);
        self.handler
            .prepare_response_headers(request, &mut response.headers);

        let mut out = BytesMut::with_capacity(256);
        response.encode(&mut out).map_err(HandshakeError::Malformed)?;
        Ok(out)
    }

    fn reject(&mut self, stream: &mut TcpStream, err: &HandshakeError) -> Disposition {
        tracing::warn!(peer = %self.peer, error = %err, "rejecting websocket upgrade");
        // best effort: the socket is closed whatever happens here
        let _ = stream.write(&handshake::rejection(err));
        Disposition::Remove
    }

    /// Writes as much of the pending response as the socket takes.
    fn drain(stream: &mut TcpStream, response: &mut BytesMut) -> io::Result<bool> {
        while !response.is_empty() {
            match stream.write(&response[..]) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => response.advance(n),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(true)
    }

    fn attach(&mut self, reactor: &mut Reactor, mut stream: TcpStream) -> Disposition {
        if let Err(err) = reactor.deregister(&mut stream) {
            tracing::warn!(peer = %self.peer, error = %err, "failed to deregister upgraded connection");
            return Disposition::Remove;
        }
        tracing::info!(peer = %self.peer, "websocket upgrade complete");
        self.handler.client_attached(stream, reactor);
        Disposition::Remove
    }

    fn advance(&mut self, reactor: &mut Reactor, token: Token, stream: &mut TcpStream) -> Option<Disposition> {
        if let Phase::AwaitingRequest = self.phase {
            let closed = match self.fill(stream) {
                Ok(closed) => closed,
                Err(err) => {
                    tracing::debug!(peer = %self.peer, error = %err, "read failed during handshake");
                    return Some(Disposition::Remove);
                }
            };

            let request = match self.parse() {
                Ok(Some(request)) => request,
                Ok(None) if closed => {
                    tracing::debug!(peer = %self.peer, "closed before completing handshake");
                    return Some(Disposition::Remove);
                }
                Ok(None) => return Some(Disposition::Keep),
                Err(err) => return Some(self.reject(stream, &err)),
            };
            if closed {
                return Some(Disposition::Remove);
            }

            let response = match self.respond(&request) {
                Ok(response) => response,
                Err(err) => return Some(self.reject(stream, &err)),
            };
            self.phase = Phase::Responding { response };
        }

        let Phase::Responding { response, .. } = &mut self.phase else {
            return Some(Disposition::Keep);
        };
        match Self::drain(stream, response) {
            Ok(true) => None,
            Ok(false) => {
                if let Err(err) = reactor.reregister(stream, token, Interest::WRITABLE) {
                    tracing::debug!(peer = %self.peer, error = %err, "reregister failed");
                    return Some(Disposition::Remove);
                }
                Some(Disposition::Keep)
            }
            Err(err) => {
                tracing::debug!(peer = %self.peer, error = %err, "write failed during handshake");
                Some(Disposition::Remove)
            }
        }
    }
}

impl<H: UpgradeHandler> Pollable for Handshake<H> {
    fn source(&mut self) -> Option<&mut dyn Source> {
        self.stream.as_mut().map(|stream| stream as &mut dyn Source)
    }

    fn ready(&mut self, reactor: &mut Reactor, token: Token, ready: Ready) -> Disposition {
        if ready.is_error() {
            tracing::debug!(peer = %self.peer, "socket error during handshake");
            return Disposition::Remove;
        }
        let Some(mut stream) = self.stream.take() else {
            return Disposition::Remove;
        };

        match self.advance(reactor, token, &mut stream) {
            Some(disposition) => {
                self.stream = Some(stream);
                disposition
            }
            // response fully written
            None => self.attach(reactor, stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::BufRead;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct Counting {
        attached: Cell<usize>,
    }

    impl UpgradeHandler for Counting {
        fn client_attached(&self, _stream: TcpStream, _reactor: &mut Reactor) {
            self.attached.set(self.attached.get() + 1);
        }
    }

    fn pump(reactor: &mut Reactor, mut done: impl FnMut() -> bool) {
        for _ in 0..100 {
            if done() {
                return;
            }
            reactor.poll_once(Some(Duration::from_millis(20))).unwrap();
        }
    }

    #[test]
    fn upgrade_attaches_once() {
        let handler = Rc::new(Counting::default());
        let mut reactor = Reactor::new().unwrap();
        let server = WebSocketServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            Rc::clone(&handler),
            ServerConfig::default(),
        )
        .unwrap();
        let addr = server.local_addr().unwrap();
        server.register(&mut reactor).unwrap();

        let mut client = std::net::TcpStream::connect(addr).unwrap();
        client
            .write_all(
                b"GET /chat HTTP/1.1\r\nHost: x\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\
                  Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 13\r\n\r\n",
            )
            .unwrap();

        pump(&mut reactor, || handler.attached.get() == 1);
        assert_eq!(handler.attached.get(), 1);
        // listener stays registered
        assert_eq!(reactor.len(), 1);

        let mut reader = io::BufReader::new(client);
        let mut status = String::new();
        reader.read_line(&mut status).unwrap();
        assert_eq!(status, "HTTP/1.1 101 Switching Protocols\r\n");
    }

    #[test]
    fn oversized_head_is_rejected() {
        let handler = Rc::new(Counting::default());
        let mut reactor = Reactor::new().unwrap();
        let config = ServerConfig {
            max_handshake_bytes: 64,
            ..ServerConfig::default()
        };
        let server = WebSocketServer::bind("127.0.0.1:0".parse().unwrap(), Rc::clone(&handler), config).unwrap();
        let addr = server.local_addr().unwrap();
        server.register(&mut reactor).unwrap();

        let mut client = std::net::TcpStream::connect(addr).unwrap();
        client.write_all(&[b'a'; 200]).unwrap();

        let mut response = Vec::new();
        client.set_read_timeout(Some(Duration::from_millis(20))).unwrap();
        pump(&mut reactor, || {
            let mut buf = [0u8; 256];
            match client.read(&mut buf) {
                Ok(0) => true,
                Ok(n) => {
                    response.extend_from_slice(&buf[..n]);
                    false
                }
                Err(_) => false,
            }
        });

        assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(handler.attached.get(), 0);
    }
}
