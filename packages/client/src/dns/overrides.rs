use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;

use super::{Candidate, Name, Resolve};

/// Resolver with fixed answers for chosen hosts, falling back to another resolver.
#[derive(Debug, Clone)]
pub struct OverrideResolver<R> {
    overrides: HashMap<String, Vec<Candidate>>,
    fallback: R,
}

impl<R: Resolve> OverrideResolver<R> {
    pub fn new(fallback: R) -> Self {
        Self {
            overrides: HashMap::new(),
            fallback,
        }
    }

    /// Answers `host` with these addresses, in order.
    #[must_use]
    pub fn with_addrs(self, host: impl Into<String>, addrs: impl IntoIterator<Item = SocketAddr>) -> Self {
        let candidates = addrs.into_iter().map(Candidate::tcp).collect();
        self.with_candidates(host, candidates)
    }

    #[must_use]
    pub fn with_candidates(mut self, host: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        self.overrides
            .insert(host.into().to_ascii_lowercase(), candidates);
        self
    }
}

impl<R: Resolve> Resolve for OverrideResolver<R> {
    fn resolve(&self, name: &Name) -> io::Result<Vec<Candidate>> {
        match self.overrides.get(&name.as_str().to_ascii_lowercase()) {
            Some(candidates) => Ok(candidates.clone()),
            None => self.fallback.resolve(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::GaiResolver;
    use super::*;

    #[test]
    fn override_wins_then_falls_back() {
        let resolver = OverrideResolver::new(GaiResolver::new()).with_addrs(
            "Service.Test",
            ["10.0.0.1:0".parse().unwrap(), "10.0.0.2:0".parse().unwrap()],
        );

        let hits = resolver.resolve(&Name::from("service.test")).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].addr.as_socket(), Some("10.0.0.2:0".parse().unwrap()));

        let literal = resolver.resolve(&Name::from("127.0.0.1")).unwrap();
        assert_eq!(literal.len(), 1);
    }
}
