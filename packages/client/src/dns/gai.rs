use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use super::{Candidate, Name, Resolve};

/// Resolver backed by the platform's `getaddrinfo`.
///
/// IP literals, bracketed or not, are returned without a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: &Name) -> io::Result<Vec<Candidate>> {
        let host = name.as_str();
        let literal = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(vec![Candidate::tcp(SocketAddr::new(ip, 0))]);
        }

        let candidates: Vec<Candidate> = (host, 0)
            .to_socket_addrs()?
            .map(Candidate::tcp)
            .collect();
        tracing::debug!(host, count = candidates.len(), "resolved");
        Ok(candidates)
    }
}
