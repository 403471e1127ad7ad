// # ddnsd - single-shot DDNS client
//
// This binary is a THIN integration layer:
// 1. Read configuration from environment variables
// 2. Initialize logging and the runtime
// 3. Register discoverers and updaters
// 4. Run the engine once and exit
//
// All DDNS logic lives in ddns-core and the plug-in crates. Scheduling is left
// to cron or a systemd timer.
//
// ## Configuration
//
// ### Google Domains (all three required)
// - `GD_HOSTNAME`, `GD_USERNAME`, `GD_PASSWORD`
//
// ### Cloudflare (first three required)
// - `CF_HOSTNAME`, `CF_TOKEN`, `CF_ZONE_ID`
// - `CF_RECORD_TYPE`: `A` (default) or `AAAA`
//
// ### Zyxel modem discoverer (replaces OpenDNS when all three are set)
// - `ZYXEL_URL`, `ZYXEL_USERNAME`, `ZYXEL_PASSWORD`
//
// ### Logging
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export CF_HOSTNAME=home.example.com
// export CF_TOKEN=your_token
// export CF_ZONE_ID=your_zone
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsConfig, DdnsEngine, ProviderRegistry};
use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const LOG_LEVEL_VAR: &str = "DDNS_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Every configured record is up to date
/// - 1: Configuration or startup error
/// - 2: Discovery or update failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Parse `DDNS_LOG_LEVEL`; unset means `info`
fn parse_log_level(value: Option<&str>) -> Result<Level> {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("info") => Ok(Level::INFO),
        Some("trace") => Ok(Level::TRACE),
        Some("debug") => Ok(Level::DEBUG),
        Some("warn") => Ok(Level::WARN),
        Some("error") => Ok(Level::ERROR),
        Some(other) => anyhow::bail!(
            "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            LOG_LEVEL_VAR,
            other
        ),
    }
}

/// Map a failed run to an exit code
///
/// Configuration errors (including "nothing configured") exit with 1,
/// everything that went wrong on the wire exits with 2.
fn exit_code_for(err: &anyhow::Error) -> DdnsExitCode {
    match err.downcast_ref::<ddns_core::Error>() {
        Some(ddns_core::Error::Config(_)) => DdnsExitCode::ConfigError,
        _ => DdnsExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    // Non-UTF-8 entries are skipped; none of ours can be one
    let vars: HashMap<String, String> = env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();

    let log_level = match parse_log_level(vars.get(LOG_LEVEL_VAR).map(String::as_str)) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match DdnsConfig::from_vars(&vars) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!(
        "Configuration loaded: discoverer {}, {} updater(s)",
        config.discoverer.type_name(),
        config.updaters.len()
    );

    // One request at a time; a single thread is all a run needs
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(()) => DdnsExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

fn build_registry() -> ProviderRegistry {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "opendns")]
    ddns_ip_opendns::register(&mut registry);

    #[cfg(feature = "zyxel")]
    ddns_ip_zyxel::register(&mut registry);

    #[cfg(feature = "googledomains")]
    ddns_provider_googledomains::register(&mut registry);

    #[cfg(feature = "cloudflare")]
    ddns_provider_cloudflare::register(&mut registry);

    registry
}

/// Discover the address once and push it to every configured record
async fn run(config: DdnsConfig) -> Result<()> {
    let registry = build_registry();

    let discoverer = registry
        .create_discoverer(&config.discoverer)
        .with_context(|| format!("creating {} discoverer", config.discoverer.type_name()))?;

    let updaters = config
        .updaters
        .iter()
        .map(|u| {
            registry
                .create_updater(u)
                .with_context(|| format!("creating {} updater", u.type_name()))
        })
        .collect::<Result<Vec<_>>>()?;

    let engine = DdnsEngine::new(discoverer, updaters);
    let report = engine.run_once().await.context("ddns run failed")?;

    info!(
        "Run complete: {} record(s) checked for {}",
        report.updates.len(),
        report.ip
    );
    Ok(())
}
