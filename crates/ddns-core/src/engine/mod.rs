//! Single-shot DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Asking the IpDiscoverer for the current public address, once
//! - Handing that address to every configured RecordUpdater, in order
//! - Stopping at the first failure
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ IpDiscoverer │─── IpAddr ───┐
//! └──────────────┘              │
//!                               ▼
//!                      ┌──────────────┐
//!                      │  DdnsEngine  │
//!                      └──────────────┘
//!                               │
//!             ┌─────────────────┼─────────────────┐
//!             ▼                 ▼                 ▼
//!     ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!     │ RecordUpdater│  │ RecordUpdater│  │     ...      │
//!     └──────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. `find()` on the discoverer
//! 2. `update(ip)` on each updater, sequentially
//! 3. Return a [`RunReport`], or the first error encountered
//!
//! There is no loop and no retry. The binary is meant to be started again by
//! an external scheduler.

use crate::error::{Error, Result};
use crate::traits::{IpDiscoverer, RecordUpdater, UpdateOutcome};
use std::net::IpAddr;
use tracing::{debug, error, info};

/// Outcome of one updater within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Provider name, as reported by the updater
    pub provider: &'static str,
    /// Managed hostname
    pub record_name: String,
    /// What the updater did
    pub outcome: UpdateOutcome,
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The discovered public address
    pub ip: IpAddr,
    /// One entry per updater, in execution order
    pub updates: Vec<UpdateReport>,
}

/// Core DDNS engine
///
/// Owns one discoverer and the list of updaters selected by the composition
/// root. Each [`DdnsEngine::run_once`] call is an independent cycle; nothing is
/// carried over between calls.
pub struct DdnsEngine {
    /// Source of the public address
    discoverer: Box<dyn IpDiscoverer>,

    /// Updaters to run, in order
    updaters: Vec<Box<dyn RecordUpdater>>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `discoverer`: IP discoverer implementation
    /// - `updaters`: Record updaters, executed in the given order
    pub fn new(discoverer: Box<dyn IpDiscoverer>, updaters: Vec<Box<dyn RecordUpdater>>) -> Self {
        Self {
            discoverer,
            updaters,
        }
    }

    /// Number of configured updaters
    pub fn updater_count(&self) -> usize {
        self.updaters.len()
    }

    /// Run one discover-then-update cycle
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: Every updater succeeded (or had nothing to do)
    /// - `Err(Error)`: The first failure; later updaters were not called
    pub async fn run_once(&self) -> Result<RunReport> {
        debug!(
            discoverer = self.discoverer.discoverer_name(),
            "Discovering public IP address"
        );

        let ip = self.discoverer.find().await.inspect_err(|e| {
            error!(
                discoverer = self.discoverer.discoverer_name(),
                kind = e.kind(),
                "IP discovery failed: {}",
                e
            );
        })?;

        info!(
            discoverer = self.discoverer.discoverer_name(),
            "Public IP address: {}", ip
        );

        if self.updaters.is_empty() {
            return Err(Error::config(format!(
                "no updater configured (current ip: {})",
                ip
            )));
        }

        let mut updates = Vec::with_capacity(self.updaters.len());

        for updater in &self.updaters {
            let provider = updater.provider_name();
            let record_name = updater.record_name().to_string();

            debug!(provider = provider, record = %record_name, "Running updater");

            let outcome = updater.update(ip).await.inspect_err(|e| {
                error!(
                    provider = provider,
                    record = %record_name,
                    kind = e.kind(),
                    "Update failed: {}",
                    e
                );
            })?;

            match &outcome {
                UpdateOutcome::Updated { previous_ip, .. } => {
                    info!(
                        provider = provider,
                        record = %record_name,
                        previous = ?previous_ip,
                        "Updated IP address of {} to {}",
                        record_name,
                        ip
                    );
                }
                UpdateOutcome::Unchanged { .. } => {
                    info!(
                        provider = provider,
                        record = %record_name,
                        "IP address of {} is current",
                        record_name
                    );
                }
            }

            updates.push(UpdateReport {
                provider,
                record_name,
                outcome,
            });
        }

        Ok(RunReport { ip, updates })
    }
}
