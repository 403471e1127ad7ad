//! Core traits for the DDNS client
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpDiscoverer`]: Find the current public IP address
//! - [`RecordUpdater`]: Push an address to a provider-managed DNS record

pub mod ip_discoverer;
pub mod record_updater;

pub use ip_discoverer::{IpDiscoverer, IpDiscovererFactory, ensure_usable};
pub use record_updater::{RecordUpdater, RecordUpdaterFactory, UpdateOutcome};
