use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, SockAddr, Type};

/// Host name handed to a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(s)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_string())
    }
}

/// One address record produced by resolution.
///
/// Resolution is host-only: the port inside `addr` is meaningless until the
/// connect loop patches in the caller's port with [`Candidate::with_port`].
#[derive(Debug, Clone)]
pub struct Candidate {
    pub domain: Domain,
    pub ty: Type,
    pub protocol: Option<Protocol>,
    pub addr: SockAddr,
}

impl Candidate {
    /// A TCP stream candidate for an IP socket address.
    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            domain: Domain::for_address(addr),
            ty: Type::STREAM,
            protocol: Some(Protocol::TCP),
            addr: addr.into(),
        }
    }

    /// Copy with `port` filled in; `None` when the family is neither IPv4 nor IPv6.
    pub fn with_port(&self, port: u16) -> Option<Self> {
        let mut ip = self.addr.as_socket()?;
        ip.set_port(port);
        Some(Self {
            addr: ip.into(),
            ..self.clone()
        })
    }
}

/// Resolves a host name to candidates, in preference order.
pub trait Resolve {
    fn resolve(&self, name: &Name) -> io::Result<Vec<Candidate>>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, name: &Name) -> io::Result<Vec<Candidate>> {
        (**self).resolve(name)
    }
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: &Name) -> io::Result<Vec<Candidate>> {
        (**self).resolve(name)
    }
}
