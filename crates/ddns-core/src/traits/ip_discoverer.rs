// # IP Discoverer Trait
//
// Defines the interface for finding the caller's apparent public IP address.
//
// ## Implementations
//
// - OpenDNS echo lookup: `ddns-ip-opendns` crate
// - Zyxel modem status page: `ddns-ip-zyxel` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpDiscoverer;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let discoverer = /* IpDiscoverer implementation */;
//
//     let ip = discoverer.find().await?;
//     println!("public address: {ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP discoverer implementations
///
/// A discoverer answers exactly one question: which address does the outside
/// world see for this host right now?
///
/// # Contract
///
/// - The returned address is always a real, specified address. An empty,
///   unparseable or unspecified (`0.0.0.0` / `::`) answer is an error, never a
///   placeholder value.
/// - Every call does its own network round trip. Sessions, cookies and resolver
///   state are not reused between calls.
/// - No retries. The first failure is returned to the caller.
///
/// Instances are not meant to be shared between concurrent callers.
#[async_trait]
pub trait IpDiscoverer: Send + Sync {
    /// Find the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The discovered address
    /// - `Err(Error)`: If the address could not be determined
    async fn find(&self) -> Result<IpAddr, crate::Error>;

    /// Get the discoverer name (for logging/debugging)
    fn discoverer_name(&self) -> &'static str;
}

/// Helper trait for constructing IP discoverers from configuration
pub trait IpDiscovererFactory: Send + Sync {
    /// Create an IpDiscoverer instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this discoverer type
    ///
    /// # Returns
    ///
    /// A boxed IpDiscoverer trait object
    fn create(
        &self,
        config: &crate::config::DiscovererConfig,
    ) -> Result<Box<dyn IpDiscoverer>, crate::Error>;
}

/// Reject addresses that are syntactically valid but carry no information.
///
/// Resolvers and scraped pages can hand back `0.0.0.0` when they have nothing
/// better; that must surface as a parse failure rather than be published.
pub fn ensure_usable(ip: IpAddr, source: &str) -> Result<IpAddr, crate::Error> {
    if ip.is_unspecified() {
        return Err(crate::Error::parse(format!(
            "{source} returned the unspecified address {ip}"
        )));
    }
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_addresses_are_rejected() {
        assert!(ensure_usable(IpAddr::from([0, 0, 0, 0]), "test").is_err());
        assert!(ensure_usable("::".parse().unwrap(), "test").is_err());
    }

    #[test]
    fn real_addresses_pass_through() {
        let ip = IpAddr::from([203, 0, 113, 5]);
        assert_eq!(ensure_usable(ip, "test").unwrap(), ip);
    }
}
