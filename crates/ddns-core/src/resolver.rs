//! Hostname resolution seam
//!
//! Discoverers and updaters that need a DNS answer go through [`HostResolver`]
//! instead of calling a resolver directly, so the answer can be pinned in tests.

use async_trait::async_trait;
use std::net::IpAddr;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolves a hostname to the addresses currently published for it
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Look up all addresses for `host`
    ///
    /// Implementations may return an empty list; callers decide whether that
    /// is an error.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system (`getaddrinfo` via tokio)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        debug!(host = %host, "Resolving via system resolver");

        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| Error::resolution(format!("lookup of {host} failed: {e}")))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        Ok(ips)
    }
}

/// Resolver that always answers with a fixed address list
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    answer: Vec<IpAddr>,
}

impl StaticResolver {
    pub fn new(answer: Vec<IpAddr>) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, _host: &str) -> Result<Vec<IpAddr>> {
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn system_resolver_handles_ip_literals() {
        let ips = SystemResolver.lookup("127.0.0.1").await.unwrap();
        assert_eq!(ips, vec![IpAddr::from([127, 0, 0, 1])]);
    }

    #[tokio::test]
    async fn static_resolver_returns_its_answer() {
        let ip = IpAddr::from([198, 51, 100, 7]);
        let resolver = StaticResolver::new(vec![ip]);
        assert_eq!(resolver.lookup("anything.example").await.unwrap(), vec![ip]);
    }
}
