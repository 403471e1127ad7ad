// # Google Domains Record Updater
//
// Updates a Google Domains dynamic DNS hostname through the dyndns2-style
// `nic/update` endpoint.
//
// ## Behaviour
//
// - Before writing, the hostname is resolved; if the new address is already
//   published nothing is sent
// - A failed pre-check resolution does not stop the update
// - One GET with basic auth; the plain-text body decides the outcome
// - HTTP timeout configured (30 seconds)
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output

use async_trait::async_trait;
use ddns_core::config::UpdaterConfig;
use ddns_core::traits::{RecordUpdater, RecordUpdaterFactory, UpdateOutcome};
use ddns_core::{Error, HostResolver, Result, SystemResolver};
use reqwest::StatusCode;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Google Domains update endpoint
const GOOGLE_DOMAINS_ENDPOINT: &str = "https://domains.google.com/nic/update";

/// Default HTTP timeout for update requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "google_domains";

/// How a 200 response body is read
#[derive(Debug, PartialEq, Eq)]
enum Reply<'a> {
    BadAuth,
    NotFqdn,
    Accepted(&'a str),
}

fn classify(body: &str) -> Reply<'_> {
    match body.trim() {
        "badauth" => Reply::BadAuth,
        "notfqdn" => Reply::NotFqdn,
        other => Reply::Accepted(other),
    }
}

/// Google Domains record updater
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
pub struct GoogleDomainsUpdater {
    hostname: String,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
    endpoint: String,
    resolver: Arc<dyn HostResolver>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GoogleDomainsUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDomainsUpdater")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GoogleDomainsUpdater {
    /// Create a new updater for `hostname` using the generated dyndns credentials
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let hostname = hostname.into();
        if hostname.is_empty() {
            return Err(Error::config("Google Domains hostname cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            hostname,
            username: username.into(),
            password: password.into(),
            endpoint: GOOGLE_DOMAINS_ENDPOINT.to_string(),
            resolver: Arc::new(SystemResolver),
            client,
        })
    }

    /// Send updates to a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a different resolver for the "already current" pre-check
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Whether `ip` is already published for the hostname
    ///
    /// Resolution failures count as "not current" so the update still goes out.
    async fn is_current(&self, ip: IpAddr) -> bool {
        match self.resolver.lookup(&self.hostname).await {
            Ok(published) => published.contains(&ip),
            Err(e) => {
                tracing::warn!(
                    hostname = %self.hostname,
                    error = %e,
                    "Pre-check resolution failed, updating anyway"
                );
                false
            }
        }
    }
}

#[async_trait]
impl RecordUpdater for GoogleDomainsUpdater {
    async fn update(&self, new_ip: IpAddr) -> Result<UpdateOutcome> {
        if self.is_current(new_ip).await {
            tracing::info!("IP {} is current for {}", new_ip, self.hostname);
            return Ok(UpdateOutcome::Unchanged { current_ip: new_ip });
        }

        tracing::info!(
            "Updating Google Domains hostname: {} -> {}",
            self.hostname,
            new_ip
        );

        let myip = new_ip.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("hostname", self.hostname.as_str()), ("myip", myip.as_str())])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(Error::provider(
                PROVIDER,
                format!("failed to update (HTTP {}): {}", status, body),
            ));
        }

        match classify(&body) {
            Reply::BadAuth => Err(Error::auth("missing auth")),
            Reply::NotFqdn => Err(Error::invalid_input(format!(
                "missing hostname to update: {}",
                self.hostname
            ))),
            Reply::Accepted(confirmation) => {
                tracing::info!("updated: {:?}", confirmation);
                Ok(UpdateOutcome::Updated {
                    previous_ip: None,
                    new_ip,
                })
            }
        }
    }

    fn record_name(&self) -> &str {
        &self.hostname
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Google Domains updaters
pub struct GoogleDomainsFactory;

impl RecordUpdaterFactory for GoogleDomainsFactory {
    fn create(&self, config: &UpdaterConfig) -> Result<Box<dyn RecordUpdater>> {
        match config {
            UpdaterConfig::GoogleDomains {
                hostname,
                username,
                password,
            } => Ok(Box::new(GoogleDomainsUpdater::new(
                hostname.clone(),
                username.clone(),
                password.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for Google Domains provider")),
        }
    }
}

/// Register the Google Domains updater with a registry
pub fn register(registry: &mut ddns_core::ProviderRegistry) {
    registry.register_updater(PROVIDER, Box::new(GoogleDomainsFactory));
}
