// # Record Updater Trait
//
// Defines the interface for pushing an address to a DNS record at a provider.
//
// ## Implementations
//
// - Cloudflare REST API: `ddns-provider-cloudflare` crate
// - Google Domains dyndns endpoint: `ddns-provider-googledomains` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::RecordUpdater;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let updater = /* RecordUpdater implementation */;
//
//     let outcome = updater
//         .update(std::net::IpAddr::from([203, 0, 113, 5]))
//         .await?;
//     println!("{outcome:?}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Result of a successful update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The provider accepted the new address
    Updated {
        /// The address the record held before, when the provider told us
        previous_ip: Option<IpAddr>,
        /// The new IP address
        new_ip: IpAddr,
    },
    /// The record already published this address; nothing was written
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
}

impl UpdateOutcome {
    /// Whether a write was sent to the provider
    pub fn is_write(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Trait for record updater implementations
///
/// Each instance owns one provider configuration (credentials, record name)
/// fixed at construction time. `update` is the only operation.
///
/// # Contract
///
/// - The managed record must already exist. Updaters never create or delete
///   records.
/// - Failures are classified through [`crate::Error`] variants and carry the
///   provider's own wording (status, code, message) so an operator can act on
///   them.
/// - No retries, no backoff, no caching between calls.
/// - Secrets never appear in logs or `Debug` output.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Push `new_ip` to the managed record
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: Updated, or Unchanged when no write was needed
    /// - `Err(Error)`: If the update failed
    async fn update(&self, new_ip: IpAddr) -> Result<UpdateOutcome, crate::Error>;

    /// The hostname this updater manages (for logging)
    fn record_name(&self) -> &str;

    /// Get the provider name (for logging/debugging)
    ///
    /// A static string identifying the provider (e.g., "cloudflare")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing record updaters from configuration
pub trait RecordUpdaterFactory: Send + Sync {
    /// Create a RecordUpdater instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed RecordUpdater trait object
    fn create(
        &self,
        config: &crate::config::UpdaterConfig,
    ) -> Result<Box<dyn RecordUpdater>, crate::Error>;
}
