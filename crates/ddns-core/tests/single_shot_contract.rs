//! Contract Test: Single-Shot Run
//!
//! Constraints verified:
//! - The discoverer is asked exactly once per run
//! - Every updater receives the discovered address, in configuration order
//! - The first error ends the run; later updaters are never called
//! - A run without updaters reports the address but fails
//!
//! If this test fails, the composition contract is broken.

mod common;

use common::*;
use ddns_core::{DdnsEngine, Error, UpdateOutcome};
use std::net::IpAddr;
use std::sync::atomic::Ordering;

const PUBLIC_IP: [u8; 4] = [203, 0, 113, 5];

#[tokio::test]
async fn discovers_once_and_updates_in_order() {
    let log = CallLog::default();
    let discoverer = ScriptedDiscoverer::returning(IpAddr::from(PUBLIC_IP), log.clone());
    let find_calls = discoverer.counter();

    let first = RecordingUpdater::new("first", log.clone());
    let second = RecordingUpdater::new("second", log.clone()).reporting_unchanged();
    let first_seen = first.seen();
    let second_seen = second.seen();

    let engine = DdnsEngine::new(Box::new(discoverer), vec![Box::new(first), Box::new(second)]);
    let report = engine.run_once().await.expect("run succeeds");

    assert_eq!(find_calls.load(Ordering::SeqCst), 1);
    assert_eq!(log.entries(), vec!["find", "update:first", "update:second"]);
    assert_eq!(*first_seen.lock().unwrap(), vec![IpAddr::from(PUBLIC_IP)]);
    assert_eq!(*second_seen.lock().unwrap(), vec![IpAddr::from(PUBLIC_IP)]);

    assert_eq!(report.ip, IpAddr::from(PUBLIC_IP));
    assert_eq!(report.updates.len(), 2);
    assert!(report.updates[0].outcome.is_write());
    assert_eq!(
        report.updates[1].outcome,
        UpdateOutcome::Unchanged {
            current_ip: IpAddr::from(PUBLIC_IP)
        }
    );
    assert_eq!(report.updates[1].record_name, "second.example.com");
}

#[tokio::test]
async fn first_updater_error_is_fatal() {
    let log = CallLog::default();
    let discoverer = ScriptedDiscoverer::returning(IpAddr::from(PUBLIC_IP), log.clone());

    let failing = RecordingUpdater::new("failing", log.clone())
        .failing(|| Error::auth("missing auth"));
    let never = RecordingUpdater::new("never", log.clone());
    let never_seen = never.seen();

    let engine = DdnsEngine::new(Box::new(discoverer), vec![Box::new(failing), Box::new(never)]);
    let err = engine.run_once().await.expect_err("run fails");

    assert!(matches!(err, Error::Authentication(_)));
    assert!(never_seen.lock().unwrap().is_empty());
    assert_eq!(log.entries(), vec!["find", "update:failing"]);
}

#[tokio::test]
async fn discovery_failure_skips_all_updaters() {
    let log = CallLog::default();
    let discoverer =
        ScriptedDiscoverer::failing(|| Error::resolution("no answer"), log.clone());
    let updater = RecordingUpdater::new("only", log.clone());
    let seen = updater.seen();

    let engine = DdnsEngine::new(Box::new(discoverer), vec![Box::new(updater)]);
    let err = engine.run_once().await.expect_err("run fails");

    assert!(matches!(err, Error::Resolution(_)));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn run_without_updaters_is_a_config_error() {
    let log = CallLog::default();
    let discoverer = ScriptedDiscoverer::returning(IpAddr::from(PUBLIC_IP), log.clone());

    let engine = DdnsEngine::new(Box::new(discoverer), Vec::new());
    assert_eq!(engine.updater_count(), 0);

    let err = engine.run_once().await.expect_err("run fails");
    match err {
        Error::Config(message) => assert!(message.contains("203.0.113.5")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.entries(), vec!["find"]);
}

#[tokio::test]
async fn repeated_runs_rediscover_every_time() {
    let log = CallLog::default();
    let discoverer = ScriptedDiscoverer::returning(IpAddr::from(PUBLIC_IP), log.clone());
    let find_calls = discoverer.counter();
    let updater = RecordingUpdater::new("only", log.clone());

    let engine = DdnsEngine::new(Box::new(discoverer), vec![Box::new(updater)]);
    engine.run_once().await.unwrap();
    engine.run_once().await.unwrap();

    assert_eq!(find_calls.load(Ordering::SeqCst), 2);
}
