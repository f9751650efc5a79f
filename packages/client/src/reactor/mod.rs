//! Single-threaded readiness loop
//!
//! Handlers own their event source and are dispatched one at a time. While
//! a handler runs it is taken out of the table, so it may freely register
//! new handlers or reregister its own source through the `&mut Reactor` it
//! is given.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use mio::event::Source;
use mio::{Events, Interest, Poll, Registry, Token};

mod ready;

pub use ready::Ready;

const EVENT_CAPACITY: usize = 256;

/// What the reactor does with a handler after dispatching to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    /// Deregister the handler's source and drop the handler.
    Remove,
}

/// A registered readiness callback and the event source it owns.
pub trait Pollable {
    /// The source to (de)register; `None` once it has been handed off.
    fn source(&mut self) -> Option<&mut dyn Source>;

    fn ready(&mut self, reactor: &mut Reactor, token: Token, ready: Ready) -> Disposition;
}

pub struct Reactor {
    poll: Poll,
    events: Events,
    pending: Vec<(Token, Ready)>,
    handlers: HashMap<Token, Box<dyn Pollable>>,
    next_token: usize,
}

impl Reactor {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(EVENT_CAPACITY),
            pending: Vec::with_capacity(EVENT_CAPACITY),
            handlers: HashMap::new(),
            next_token: 0,
        })
    }

    /// Registers `handler`'s source with `interest` and takes ownership of it.
    pub fn register(&mut self, mut handler: Box<dyn Pollable>, interest: Interest) -> io::Result<Token> {
        let token = Token(self.next_token);
        let source = handler
            .source()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "handler has no event source"))?;
        self.poll.registry().register(source, token, interest)?;

        self.next_token += 1;
        self.handlers.insert(token, handler);
        tracing::trace!(?token, "registered");
        Ok(token)
    }

    pub fn reregister<S: Source + ?Sized>(&self, source: &mut S, token: Token, interest: Interest) -> io::Result<()> {
        self.poll.registry().reregister(source, token, interest)
    }

    /// Removes `source` from the interest set without touching any handler.
    pub fn deregister<S: Source + ?Sized>(&self, source: &mut S) -> io::Result<()> {
        self.poll.registry().deregister(source)
    }

    pub fn registry(&self) -> &Registry {
        self.poll.registry()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Waits for readiness once and dispatches what arrived.
    ///
    /// Returns the number of handler invocations; an interrupted wait counts
    /// as zero events.
    pub fn poll_once(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return Ok(0),
            Err(err) => return Err(err),
        }

        let mut pending = std::mem::take(&mut self.pending);
        pending.extend(
            self.events
                .iter()
                .map(|event| (event.token(), Ready::from_event(event))),
        );

        let mut dispatched = 0;
        for (token, ready) in pending.drain(..) {
            // a handler removed earlier in this batch leaves stale events behind
            let Some(mut handler) = self.handlers.remove(&token) else {
                continue;
            };
            dispatched += 1;

            match handler.ready(self, token, ready) {
                Disposition::Keep => {
                    self.handlers.insert(token, handler);
                }
                Disposition::Remove => {
                    if let Some(source) = handler.source()
                        && let Err(err) = self.poll.registry().deregister(source)
                    {
                        tracing::debug!(?token, error = %err, "deregister failed");
                    }
                    tracing::trace!(?token, "removed");
                }
            }
        }

        self.pending = pending;
        Ok(dispatched)
    }

    /// Dispatches until no handlers remain.
    pub fn run(&mut self) -> io::Result<()> {
        while !self.handlers.is_empty() {
            self.poll_once(None)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactor")
            .field("handlers", &self.handlers.len())
            .field("next_token", &self.next_token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::{Read, Write};
    use std::rc::Rc;

    use mio::net::TcpStream;

    use super::*;

    struct Echo {
        stream: TcpStream,
        seen: Rc<RefCell<Vec<u8>>>,
    }

    impl Pollable for Echo {
        fn source(&mut self) -> Option<&mut dyn Source> {
            Some(&mut self.stream)
        }

        fn ready(&mut self, _reactor: &mut Reactor, _token: Token, ready: Ready) -> Disposition {
            assert!(ready.is_readable() || ready.is_hangup());
            let mut buf = [0u8; 64];
            loop {
                match self.stream.read(&mut buf) {
                    Ok(0) => return Disposition::Remove,
                    Ok(n) => self.seen.borrow_mut().extend_from_slice(&buf[..n]),
                    Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Disposition::Keep,
                    Err(_) => return Disposition::Remove,
                }
            }
        }
    }

    #[test]
    fn dispatches_until_handler_removes_itself() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = std::net::TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        server.set_nonblocking(true).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reactor = Reactor::new().unwrap();
        reactor
            .register(
                Box::new(Echo {
                    stream: TcpStream::from_std(server),
                    seen: Rc::clone(&seen),
                }),
                Interest::READABLE,
            )
            .unwrap();

        client.write_all(b"ping").unwrap();
        drop(client);

        for _ in 0..50 {
            if reactor.is_empty() {
                break;
            }
            reactor.poll_once(Some(Duration::from_millis(100))).unwrap();
        }
        assert!(reactor.is_empty());
        assert_eq!(&*seen.borrow(), b"ping");
    }
}
