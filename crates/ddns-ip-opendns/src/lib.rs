// # OpenDNS IP Discoverer
//
// Finds the public address by asking an OpenDNS resolver for
// `myip.opendns.com`. OpenDNS answers that name with the source address of the
// query, which is the caller's public address.
//
// The query goes straight to 208.67.220.220:53; the system resolver is
// bypassed because a forwarding resolver would report its own address.

use async_trait::async_trait;
use ddns_core::config::DiscovererConfig;
use ddns_core::traits::{IpDiscoverer, IpDiscovererFactory, ensure_usable};
use ddns_core::{Error, HostResolver, ProviderRegistry, Result};
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Name OpenDNS answers with the querying address
pub const ECHO_HOSTNAME: &str = "myip.opendns.com";

/// resolver2.opendns.com
pub const OPENDNS_NAMESERVER: SocketAddr =
    SocketAddr::new(IpAddr::V4(std::net::Ipv4Addr::new(208, 67, 220, 220)), 53);

/// Resolver that sends every query to one fixed nameserver
pub struct PinnedResolver {
    nameserver: SocketAddr,
    resolver: TokioResolver,
}

impl std::fmt::Debug for PinnedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinnedResolver")
            .field("nameserver", &self.nameserver)
            .finish()
    }
}

impl PinnedResolver {
    pub fn new(nameserver: SocketAddr) -> Self {
        let group =
            NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let resolver = Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(ResolverOpts::default())
            .build();

        Self {
            nameserver,
            resolver,
        }
    }
}

#[async_trait]
impl HostResolver for PinnedResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        tracing::debug!(host = %host, nameserver = %self.nameserver, "Querying pinned nameserver");

        let answer = self.resolver.lookup_ip(host).await.map_err(|e| {
            Error::resolution(format!(
                "lookup of {} via {} failed: {}",
                host, self.nameserver, e
            ))
        })?;

        Ok(answer.iter().collect())
    }
}

/// Public address discovery through the OpenDNS echo name
pub struct OpenDnsDiscoverer {
    resolver: Arc<dyn HostResolver>,
}

impl OpenDnsDiscoverer {
    /// Discoverer using the public OpenDNS nameserver
    pub fn new() -> Self {
        Self::with_nameserver(OPENDNS_NAMESERVER)
    }

    /// Discoverer querying a different nameserver
    pub fn with_nameserver(nameserver: SocketAddr) -> Self {
        Self::with_resolver(Arc::new(PinnedResolver::new(nameserver)))
    }

    /// Discoverer answering through an arbitrary resolver
    pub fn with_resolver(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }
}

impl Default for OpenDnsDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpDiscoverer for OpenDnsDiscoverer {
    async fn find(&self) -> Result<IpAddr> {
        let answers = self.resolver.lookup(ECHO_HOSTNAME).await?;

        let first = answers.first().copied().ok_or_else(|| {
            Error::resolution(format!("{} returned no addresses", ECHO_HOSTNAME))
        })?;

        if answers.len() > 1 {
            tracing::debug!(answers = ?answers, "Multiple answers, using the first");
        }

        let ip = ensure_usable(first, "opendns")?;
        tracing::debug!("OpenDNS reports {}", ip);
        Ok(ip)
    }

    fn discoverer_name(&self) -> &'static str {
        "opendns"
    }
}

/// Factory for creating OpenDNS discoverers
pub struct OpenDnsFactory;

impl IpDiscovererFactory for OpenDnsFactory {
    fn create(&self, config: &DiscovererConfig) -> Result<Box<dyn IpDiscoverer>> {
        match config {
            DiscovererConfig::OpenDns => Ok(Box::new(OpenDnsDiscoverer::new())),
            _ => Err(Error::config("Invalid config for OpenDNS discoverer")),
        }
    }
}

/// Register the OpenDNS discoverer with a registry
pub fn register(registry: &mut ProviderRegistry) {
    registry.register_discoverer("opendns", Box::new(OpenDnsFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_nameserver_is_opendns() {
        assert_eq!(OPENDNS_NAMESERVER.to_string(), "208.67.220.220:53");
    }

    #[tokio::test]
    async fn factory_accepts_only_opendns_config() {
        assert!(OpenDnsFactory.create(&DiscovererConfig::OpenDns).is_ok());

        let zyxel = DiscovererConfig::Zyxel {
            base_url: "http://192.168.1.1".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        assert!(OpenDnsFactory.create(&zyxel).is_err());
    }

    #[test]
    fn register_adds_factory() {
        let mut registry = ProviderRegistry::new();
        register(&mut registry);
        assert!(registry.has_discoverer("opendns"));
    }
}
