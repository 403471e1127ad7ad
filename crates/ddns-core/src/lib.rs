// # ddns-core
//
// Core library for the single-shot DDNS client.
//
// ## Architecture Overview
//
// This library provides the pieces every run is assembled from:
// - **IpDiscoverer**: Trait for finding the caller's public IP address
// - **RecordUpdater**: Trait for pushing an address to a provider-managed DNS record
// - **HostResolver**: Trait for plain hostname resolution (used by discoverers and
//   by updaters that pre-check the published address)
// - **DdnsEngine**: Runs discover-then-update exactly once
// - **ProviderRegistry**: Plugin-based registry for discoverers and updaters
//
// ## Design Principles
//
// 1. **Single-shot**: One discovery, one update per configured provider, then exit.
//    Scheduling belongs to whatever invokes the binary (cron, systemd timers).
// 2. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 3. **Stateless**: Nothing is cached between runs; the provider is always asked
// 4. **Fail-fast**: The first error ends the run; there is no retry logic anywhere

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod resolver;

// Re-export core types for convenience
pub use traits::{IpDiscoverer, RecordUpdater, UpdateOutcome};
pub use engine::{DdnsEngine, RunReport, UpdateReport};
pub use registry::ProviderRegistry;
pub use config::{DdnsConfig, DiscovererConfig, UpdaterConfig};
pub use error::{Error, Result};
pub use resolver::{HostResolver, StaticResolver, SystemResolver};
