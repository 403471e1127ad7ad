//! Plugin-based provider registry
//!
//! The registry allows record updaters and IP discoverers to be registered
//! by name at startup, avoiding hardcoded if-else chains in the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ProviderRegistry;
//! use ddns_core::config::UpdaterConfig;
//!
//! // Create a registry
//! let mut registry = ProviderRegistry::new();
//!
//! // Register providers
//! ddns_provider_cloudflare::register(&mut registry);
//!
//! // Create updater from config
//! let config = UpdaterConfig::Cloudflare { ... };
//! let updater = registry.create_updater(&config)?;
//! ```

use crate::config::{DiscovererConfig, UpdaterConfig};
use crate::error::{Error, Result};
use crate::traits::{IpDiscoverer, IpDiscovererFactory, RecordUpdater, RecordUpdaterFactory};
use std::collections::HashMap;

/// Registry mapping type names to factories
///
/// Registration happens once during startup, before any lookup, so the maps
/// are plain owned collections.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered record updater factories
    updaters: HashMap<String, Box<dyn RecordUpdaterFactory>>,

    /// Registered IP discoverer factories
    discoverers: HashMap<String, Box<dyn IpDiscovererFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record updater factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "cloudflare", "google_domains")
    /// - `factory`: Factory object for creating updater instances
    pub fn register_updater(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn RecordUpdaterFactory>,
    ) {
        self.updaters.insert(name.into(), factory);
    }

    /// Register an IP discoverer factory
    ///
    /// # Parameters
    ///
    /// - `name`: Discoverer type name (e.g., "opendns", "zyxel")
    /// - `factory`: Factory object for creating discoverer instances
    pub fn register_discoverer(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn IpDiscovererFactory>,
    ) {
        self.discoverers.insert(name.into(), factory);
    }

    /// Create a record updater from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordUpdater>)`: Created updater instance
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_updater(&self, config: &UpdaterConfig) -> Result<Box<dyn RecordUpdater>> {
        let provider_type = config.type_name();

        let factory = self
            .updaters
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create an IP discoverer from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn IpDiscoverer>)`: Created discoverer instance
    /// - `Err(Error)`: If the discoverer type is not registered or creation fails
    pub fn create_discoverer(&self, config: &DiscovererConfig) -> Result<Box<dyn IpDiscoverer>> {
        let discoverer_type = config.type_name();

        let factory = self.discoverers.get(discoverer_type).ok_or_else(|| {
            Error::config(format!("Unknown discoverer type: {}", discoverer_type))
        })?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_updaters(&self) -> Vec<String> {
        self.updaters.keys().cloned().collect()
    }

    /// List all registered discoverer types
    pub fn list_discoverers(&self) -> Vec<String> {
        self.discoverers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_updater(&self, name: &str) -> bool {
        self.updaters.contains_key(name)
    }

    /// Check if a discoverer type is registered
    pub fn has_discoverer(&self, name: &str) -> bool {
        self.discoverers.contains_key(name)
    }
}
