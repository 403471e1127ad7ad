// # Cloudflare Record Updater
//
// This crate provides a Cloudflare DNS record updater for the DDNS client.
//
// ## Behaviour
//
// - Two requests per update: look the record up, then PUT the full record back
//   with the new content
// - The record must already exist; it is never created
// - Every response is decoded as a Cloudflare envelope regardless of HTTP status,
//   and `success: false` is turned into one combined error
// - HTTP timeout configured (30 seconds)
// - No retry, no backoff, no caching
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::UpdaterConfig;
use ddns_core::traits::{RecordUpdater, RecordUpdaterFactory, UpdateOutcome};
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL used when the API omits one; `1` means "automatic" to Cloudflare
const DEFAULT_TTL: u32 = 1;

/// Envelope error codes that mean the token itself was refused
const AUTH_ERROR_CODES: &[i64] = &[9106, 9109, 10000, 10001];

const PROVIDER: &str = "cloudflare";

/// Response wrapper shared by every Cloudflare v4 endpoint
///
/// Fields are optional on purpose: the live API has been seen to drop some of
/// them, and the absence of `success` is treated as failure.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    #[serde(default)]
    messages: Vec<Value>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    result_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(default)]
    page: u64,
    #[serde(default)]
    per_page: u64,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    total_count: u64,
}

/// One entry of a `dns_records` listing, every field optional
#[derive(Debug, Default, Deserialize)]
struct RecordEntry {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    record_type: Option<String>,
    content: Option<String>,
    /// Decoded as a float so that both `300` and `300.0` are accepted
    ttl: Option<f64>,
}

/// The record body sent back on update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    /// Record type, e.g. `A`
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (the address)
    pub content: String,
    /// Time to live in seconds, `1` for automatic
    pub ttl: u32,
}

/// Fold the envelope's error list into a single error.
///
/// Any well-known authentication code makes the whole failure an
/// authentication error; otherwise it is reported as a provider error. The
/// message keeps every `code: message` pair so nothing is lost.
fn envelope_error(status: StatusCode, errors: &[ApiError]) -> Error {
    if errors.is_empty() {
        return Error::provider(
            PROVIDER,
            format!("request failed without error details (HTTP {})", status),
        );
    }

    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ");

    if errors.iter().any(|e| AUTH_ERROR_CODES.contains(&e.code)) {
        Error::auth(format!("cloudflare rejected the API token: {}", message))
    } else {
        Error::provider(PROVIDER, message)
    }
}

/// Cloudflare record updater
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareUpdater {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone ID the record lives in
    zone_id: String,

    /// Fully-qualified record name
    record_name: String,

    /// Record type (A or AAAA)
    record_type: String,

    /// API base URL, overridable for tests
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareUpdater")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareUpdater {
    /// Create a new Cloudflare updater
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Zone identifier
    /// - `record_name`: Fully-qualified record name
    /// - `record_type`: Record type; empty means `A`
    ///
    /// # Security
    ///
    /// The API token will NEVER be logged or displayed in error messages.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_name: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let mut record_type = record_type.into();
        if record_type.is_empty() {
            record_type = "A".to_string();
        }

        // Build HTTP client with timeout
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id: zone_id.into(),
            record_name: record_name.into(),
            record_type,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the updater at a different API base (no trailing slash)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and unwrap the Cloudflare envelope
    ///
    /// The body is decoded whatever the HTTP status is, because Cloudflare
    /// reports its failures inside the envelope.
    async fn call(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            Error::parse(format!(
                "Failed to decode Cloudflare response (HTTP {}): {}",
                status, e
            ))
        })?;

        if !envelope.success {
            return Err(envelope_error(status, &envelope.errors));
        }

        if !envelope.messages.is_empty() {
            tracing::debug!(messages = ?envelope.messages, "Cloudflare messages");
        }
        if let Some(info) = &envelope.result_info {
            tracing::debug!(
                page = info.page,
                per_page = info.per_page,
                count = info.count,
                total_count = info.total_count,
                "Cloudflare result page"
            );
        }

        Ok(envelope.result)
    }

    /// Look up the managed record
    ///
    /// # Returns
    ///
    /// - `Ok((id, record))`: The record ID and its current body
    /// - `Err(Error::NotFound)`: No record matches name and type
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn get_record(&self) -> Result<(String, DnsRecord)> {
        tracing::debug!(
            "Looking up record: {} (type: {})",
            self.record_name,
            self.record_type
        );

        let url = format!("{}/zones/{}/dns_records", self.base_url, self.zone_id);
        let request = self.request(Method::GET, &url).query(&[
            ("name", self.record_name.as_str()),
            ("type", self.record_type.as_str()),
        ]);

        let result = self.call(request).await?;

        let entries = result.as_array().ok_or_else(|| {
            Error::parse(format!(
                "Invalid response format: expected a record list, got {}",
                json_kind(&result)
            ))
        })?;

        let first = entries.first().ok_or_else(|| {
            Error::not_found(format!(
                "missing record: {} (type: {})",
                self.record_name, self.record_type
            ))
        })?;

        let entry: RecordEntry = serde_json::from_value(first.clone()).map_err(|e| {
            Error::parse(format!("Invalid response format: record entry: {}", e))
        })?;

        let id = entry.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            Error::not_found(format!(
                "missing record: {} (listing has no record id)",
                self.record_name
            ))
        })?;

        let record = DnsRecord {
            record_type: entry.record_type.unwrap_or_else(|| self.record_type.clone()),
            name: entry.name.unwrap_or_else(|| self.record_name.clone()),
            content: entry.content.unwrap_or_default(),
            ttl: ttl_seconds(entry.ttl),
        };

        tracing::debug!("Found record ID: {}", id);
        Ok((id, record))
    }

    /// Write the record back with new content
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1 }
    /// ```
    async fn put_record(&self, id: &str, record: &DnsRecord) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, self.zone_id, id
        );
        let request = self.request(Method::PUT, &url).json(record);
        self.call(request).await?;
        Ok(())
    }
}

/// Truncate a listed TTL to whole seconds, falling back to automatic
fn ttl_seconds(raw: Option<f64>) -> u32 {
    match raw {
        Some(ttl) if ttl.is_finite() && ttl >= 1.0 => ttl as u32,
        _ => DEFAULT_TTL,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl RecordUpdater for CloudflareUpdater {
    /// Update the managed record with a new IP address
    ///
    /// The record is always written, even when its content already matches;
    /// the lookup only supplies the record ID and the fields to preserve.
    async fn update(&self, new_ip: IpAddr) -> Result<UpdateOutcome> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            self.record_name,
            new_ip,
            self.record_type
        );

        // Step 1: Find the record
        let (id, mut record) = self.get_record().await?;
        let previous_ip = record.content.parse::<IpAddr>().ok();

        // Step 2: Replace content, keep everything else
        record.content = new_ip.to_string();
        self.put_record(&id, &record).await?;

        tracing::info!(
            "DNS record updated successfully: {} -> {} (was: {})",
            record.name,
            new_ip,
            previous_ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(UpdateOutcome::Updated {
            previous_ip,
            new_ip,
        })
    }

    fn record_name(&self) -> &str {
        &self.record_name
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloudflare updaters
pub struct CloudflareFactory;

impl RecordUpdaterFactory for CloudflareFactory {
    fn create(&self, config: &UpdaterConfig) -> Result<Box<dyn RecordUpdater>> {
        match config {
            UpdaterConfig::Cloudflare {
                api_token,
                zone_id,
                record_name,
                record_type,
            } => Ok(Box::new(CloudflareUpdater::new(
                api_token.clone(),
                zone_id.clone(),
                record_name.clone(),
                record_type.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare updater with a registry
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// ddns_provider_cloudflare::register(&mut registry);
/// assert!(registry.has_updater("cloudflare"));
/// ```
pub fn register(registry: &mut ddns_core::ProviderRegistry) {
    registry.register_updater(PROVIDER, Box::new(CloudflareFactory));
}
