// # Zyxel Modem IP Discoverer
//
// Reads the WAN address straight from a Zyxel modem's connection status page.
// Useful behind carrier setups where echo services report the wrong address.
//
// ## Flow
//
// 1. POST the admin credentials to `/login.cgi`
// 2. The modem answers with a session cookie; without one the login failed
// 3. GET `/modemstatus_connectionstatus.html`
// 4. Pull the `var allStatus = "...";` line out of the page script and split it
//    on `||`; field 7 is the IPv4 WAN address, field 8 the IPv6 one
//
// Every `find()` builds a fresh client and cookie jar, so no session outlives
// the call.

use async_trait::async_trait;
use ddns_core::config::DiscovererConfig;
use ddns_core::traits::{IpDiscoverer, IpDiscovererFactory, ensure_usable};
use ddns_core::{Error, ProviderRegistry, Result};
use regex::Regex;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use std::net::IpAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Default HTTP timeout for modem requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "/login.cgi";
const STATUS_PATH: &str = "/modemstatus_connectionstatus.html";

/// Minimum number of `||` fields in `allStatus`
const MIN_STATUS_FIELDS: usize = 9;
const IPV4_FIELD: usize = 7;
const IPV6_FIELD: usize = 8;

static ALL_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m:^var allStatus = "(.*)";\r?\n)"#).expect("allStatus pattern is valid")
});

/// Addresses published on the status page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WanAddresses {
    pub ipv4: IpAddr,
    pub ipv6: Option<IpAddr>,
}

/// Extract the WAN addresses from the status page body
pub fn parse_status_page(body: &str) -> Result<WanAddresses> {
    let payload = ALL_STATUS
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or_else(|| Error::parse("unable to find ip address, no allStatus line on status page"))?
        .as_str();

    let fields: Vec<&str> = payload.split("||").collect();
    if fields.len() < MIN_STATUS_FIELDS {
        return Err(Error::parse(format!(
            "unable to find ip address, expected at least {} status fields, got {}",
            MIN_STATUS_FIELDS,
            fields.len()
        )));
    }

    let ipv4 = fields[IPV4_FIELD].trim().parse::<IpAddr>().map_err(|_| {
        Error::parse(format!(
            "status field {} is not an address: {:?}",
            IPV4_FIELD, fields[IPV4_FIELD]
        ))
    })?;
    let ipv6 = fields[IPV6_FIELD].trim().parse::<IpAddr>().ok();

    Ok(WanAddresses { ipv4, ipv6 })
}

/// Zyxel status-page discoverer
pub struct ZyxelDiscoverer {
    base_url: String,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
}

impl std::fmt::Debug for ZyxelDiscoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZyxelDiscoverer")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl ZyxelDiscoverer {
    /// Create a discoverer for the modem at `base_url` (e.g. `http://192.168.1.1`)
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::config(format!("Invalid Zyxel base URL {}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            username: username.into(),
            password: password.into(),
        })
    }

    fn status_url(&self) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, STATUS_PATH))
            .map_err(|e| Error::config(format!("Invalid Zyxel status URL: {}", e)))
    }

    /// Log in and fetch the status page body
    async fn fetch_status_page(&self) -> Result<String> {
        let status_url = self.status_url()?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let login_url = format!("{}{}", self.base_url, LOGIN_PATH);
        tracing::debug!("Logging in to modem at {}", login_url);

        let login = client
            .post(&login_url)
            .form(&[
                ("admin_username", self.username.as_str()),
                ("admin_password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::transport(format!("Modem login request failed: {}", e)))?;

        // The status code says nothing useful; only the session cookie does.
        tracing::debug!("Login answered with HTTP {}", login.status());

        if jar.cookies(&status_url).is_none() {
            return Err(Error::auth("login to modem failed: no session cookie"));
        }

        let response = client
            .get(status_url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Status page request failed: {}", e)))?;

        response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read status page: {}", e)))
    }
}

#[async_trait]
impl IpDiscoverer for ZyxelDiscoverer {
    async fn find(&self) -> Result<IpAddr> {
        let body = self.fetch_status_page().await?;
        let addresses = parse_status_page(&body)?;

        tracing::info!(
            ipv4 = %addresses.ipv4,
            ipv6 = ?addresses.ipv6,
            "Modem WAN addresses"
        );

        ensure_usable(addresses.ipv4, "zyxel")
    }

    fn discoverer_name(&self) -> &'static str {
        "zyxel"
    }
}

/// Factory for creating Zyxel discoverers
pub struct ZyxelFactory;

impl IpDiscovererFactory for ZyxelFactory {
    fn create(&self, config: &DiscovererConfig) -> Result<Box<dyn IpDiscoverer>> {
        match config {
            DiscovererConfig::Zyxel {
                base_url,
                username,
                password,
            } => Ok(Box::new(ZyxelDiscoverer::new(
                base_url.clone(),
                username.clone(),
                password.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for Zyxel discoverer")),
        }
    }
}

/// Register the Zyxel discoverer with a registry
pub fn register(registry: &mut ProviderRegistry) {
    registry.register_discoverer("zyxel", Box::new(ZyxelFactory));
}
