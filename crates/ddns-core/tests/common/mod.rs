//! Test doubles and common utilities for run contract tests
//!
//! This module provides minimal test doubles that record how the engine
//! drives them, without doing any network I/O.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{IpDiscoverer, RecordUpdater, UpdateOutcome};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared log of calls, in the order they happened
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// What a scripted discoverer should answer
pub enum Discovery {
    Address(IpAddr),
    Fail(fn() -> Error),
}

/// A discoverer that returns a scripted answer and counts calls
pub struct ScriptedDiscoverer {
    answer: Discovery,
    find_call_count: Arc<AtomicUsize>,
    log: CallLog,
}

impl ScriptedDiscoverer {
    pub fn returning(ip: IpAddr, log: CallLog) -> Self {
        Self {
            answer: Discovery::Address(ip),
            find_call_count: Arc::new(AtomicUsize::new(0)),
            log,
        }
    }

    pub fn failing(make_error: fn() -> Error, log: CallLog) -> Self {
        Self {
            answer: Discovery::Fail(make_error),
            find_call_count: Arc::new(AtomicUsize::new(0)),
            log,
        }
    }

    /// Counter handle that survives moving the discoverer into the engine
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.find_call_count)
    }
}

#[async_trait::async_trait]
impl IpDiscoverer for ScriptedDiscoverer {
    async fn find(&self) -> Result<IpAddr> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("find");
        match &self.answer {
            Discovery::Address(ip) => Ok(*ip),
            Discovery::Fail(make_error) => Err(make_error()),
        }
    }

    fn discoverer_name(&self) -> &'static str {
        "scripted"
    }
}

/// An updater that records the addresses it was given
pub struct RecordingUpdater {
    name: &'static str,
    record: String,
    fail_with: Option<fn() -> Error>,
    unchanged: bool,
    seen: Arc<Mutex<Vec<IpAddr>>>,
    log: CallLog,
}

impl RecordingUpdater {
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            record: format!("{name}.example.com"),
            fail_with: None,
            unchanged: false,
            seen: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }

    pub fn failing(mut self, make_error: fn() -> Error) -> Self {
        self.fail_with = Some(make_error);
        self
    }

    pub fn reporting_unchanged(mut self) -> Self {
        self.unchanged = true;
        self
    }

    /// Handle to the addresses seen, usable after the updater is boxed
    pub fn seen(&self) -> Arc<Mutex<Vec<IpAddr>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait::async_trait]
impl RecordUpdater for RecordingUpdater {
    async fn update(&self, new_ip: IpAddr) -> Result<UpdateOutcome> {
        self.seen.lock().unwrap().push(new_ip);
        self.log.push(format!("update:{}", self.name));

        if let Some(make_error) = self.fail_with {
            return Err(make_error());
        }

        if self.unchanged {
            Ok(UpdateOutcome::Unchanged { current_ip: new_ip })
        } else {
            Ok(UpdateOutcome::Updated {
                previous_ip: None,
                new_ip,
            })
        }
    }

    fn record_name(&self) -> &str {
        &self.record
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}
