//! Opening handshakes against a reactor-driven upgrade server

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::rc::Rc;
use std::time::Duration;

use spindle_client::prelude::*;

const UPGRADE: &[u8] = b"GET /chat HTTP/1.1\r\nHost: server.example.com\r\nUpgrade: websocket\r\n\
Connection: keep-alive, Upgrade\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
Sec-WebSocket-Protocol: chat\r\nSec-WebSocket-Version: 13\r\n\r\n";

/// Keeps attached streams so the test can talk over them.
#[derive(Default)]
struct Collecting {
    attached: RefCell<Vec<mio::net::TcpStream>>,
}

impl Collecting {
    fn count(&self) -> usize {
        self.attached.borrow().len()
    }
}

impl UpgradeHandler for Collecting {
    fn prepare_response_headers(&self, request: &RequestHead, headers: &mut HeaderCollection) {
        if request.headers.find_token("Sec-WebSocket-Protocol", "chat") {
            headers.append("Sec-WebSocket-Protocol", "chat");
        }
    }

    fn client_attached(&self, stream: mio::net::TcpStream, _reactor: &mut Reactor) {
        self.attached.borrow_mut().push(stream);
    }
}

struct Harness {
    reactor: Reactor,
    handler: Rc<Collecting>,
    client: TcpStream,
}

impl Harness {
    fn start() -> Self {
        Self::with_config(ServerConfig::default())
    }

    fn with_config(config: ServerConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let handler = Rc::new(Collecting::default());
        let mut reactor = Reactor::new().unwrap();
        let server = WebSocketServer::bind("127.0.0.1:0".parse().unwrap(), Rc::clone(&handler), config).unwrap();
        let addr = server.local_addr().unwrap();
        server.register(&mut reactor).unwrap();

        let client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_millis(10))).unwrap();
        Self {
            reactor,
            handler,
            client,
        }
    }

    fn pump(&mut self, rounds: usize) {
        for _ in 0..rounds {
            self.reactor.poll_once(Some(Duration::from_millis(10))).unwrap();
        }
    }

    fn pump_until_attached(&mut self) {
        for _ in 0..200 {
            if self.handler.count() > 0 {
                return;
            }
            self.pump(1);
        }
        panic!("client was never attached");
    }

    /// Drives the reactor until the server closes the client, returning
    /// everything it sent.
    fn read_until_closed(&mut self) -> String {
        let mut received = Vec::new();
        for _ in 0..200 {
            self.pump(1);
            let mut buf = [0u8; 512];
            match self.client.read(&mut buf) {
                Ok(0) => return String::from_utf8(received).unwrap(),
                Ok(n) => received.extend_from_slice(&buf[..n]),
                Err(_) => {}
            }
        }
        panic!("server never closed the connection");
    }

    fn read_response_head(&mut self) -> String {
        let mut received = Vec::new();
        for _ in 0..200 {
            if received.ends_with(b"\r\n\r\n") {
                return String::from_utf8(received).unwrap();
            }
            self.pump(1);
            let mut byte = [0u8; 1];
            if let Ok(1) = self.client.read(&mut byte) {
                received.push(byte[0]);
            }
        }
        panic!("no complete response head");
    }
}

#[test]
fn upgrade_response_carries_accept_and_extra_headers() {
    let mut harness = Harness::start();
    harness.client.write_all(UPGRADE).unwrap();

    harness.pump_until_attached();
    let head = harness.read_response_head();

    assert!(head.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
    assert!(head.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
    assert!(head.contains("Sec-WebSocket-Protocol: chat\r\n"));
    assert_eq!(harness.handler.count(), 1);
    // only the listener remains registered
    assert_eq!(harness.reactor.len(), 1);
}

#[test]
fn attached_stream_belongs_to_the_handler() {
    let mut harness = Harness::start();
    harness.client.write_all(UPGRADE).unwrap();
    harness.pump_until_attached();
    harness.read_response_head();

    let mut frame = [0u8; 4];
    harness.handler.attached.borrow_mut()[0]
        .write_all(&[0x81, 0x02, b'h', b'i'])
        .unwrap();
    harness.client.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    harness.client.read_exact(&mut frame).unwrap();
    assert_eq!(frame, [0x81, 0x02, b'h', b'i']);
}

#[test]
fn request_split_across_reads_is_reassembled() {
    let mut harness = Harness::start();
    let (first, second) = UPGRADE.split_at(40);

    harness.client.write_all(first).unwrap();
    harness.pump(5);
    assert_eq!(harness.handler.count(), 0);
    assert_eq!(harness.reactor.len(), 2);

    harness.client.write_all(second).unwrap();
    harness.pump_until_attached();
    assert!(harness.read_response_head().starts_with("HTTP/1.1 101 "));
}

#[test]
fn missing_upgrade_header_is_never_attached() {
    let mut harness = Harness::start();
    harness
        .client
        .write_all(
            b"GET /chat HTTP/1.1\r\nHost: x\r\nConnection: Upgrade\r\n\
              Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 13\r\n\r\n",
        )
        .unwrap();

    let response = harness.read_until_closed();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(harness.handler.count(), 0);
    assert_eq!(harness.reactor.len(), 1);
}

#[test]
fn unsupported_version_advertises_thirteen() {
    let mut harness = Harness::start();
    harness
        .client
        .write_all(
            b"GET / HTTP/1.1\r\nHost: x\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\
              Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 8\r\n\r\n",
        )
        .unwrap();

    let response = harness.read_until_closed();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("Sec-WebSocket-Version: 13\r\n"));
    assert_eq!(harness.handler.count(), 0);
}

#[test]
fn bytes_after_request_head_are_rejected() {
    let mut harness = Harness::start();
    let mut request = UPGRADE.to_vec();
    request.extend_from_slice(&[0x81, 0x80, 0, 0, 0, 0]);
    harness.client.write_all(&request).unwrap();

    let response = harness.read_until_closed();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(harness.handler.count(), 0);
}

#[test]
fn short_key_is_rejected() {
    let mut harness = Harness::start();
    harness
        .client
        .write_all(
            b"GET / HTTP/1.1\r\nHost: x\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\
              Sec-WebSocket-Key: c2hvcnQ=\r\nSec-WebSocket-Version: 13\r\n\r\n",
        )
        .unwrap();

    assert!(harness.read_until_closed().starts_with("HTTP/1.1 400 "));
    assert_eq!(harness.handler.count(), 0);
}

#[test]
fn client_closing_early_is_dropped_quietly() {
    let mut harness = Harness::start();
    harness.client.write_all(b"GET /chat HTTP/1.1\r\nHost").unwrap();
    harness.pump(3);
    harness.client.shutdown(std::net::Shutdown::Both).unwrap();

    for _ in 0..50 {
        if harness.reactor.len() == 1 {
            break;
        }
        harness.pump(1);
    }
    assert_eq!(harness.reactor.len(), 1);
    assert_eq!(harness.handler.count(), 0);
}
