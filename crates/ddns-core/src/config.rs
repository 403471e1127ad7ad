//! Configuration types for the DDNS client
//!
//! Configuration arrives as a flat set of named string values (the process
//! environment, in practice). [`DdnsConfig::from_vars`] turns that map into
//! typed provider configurations. A provider whose key set is incomplete is
//! simply not configured; that is not an error.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Google Domains: managed hostname
pub const GD_HOSTNAME: &str = "GD_HOSTNAME";
/// Google Domains: dyndns username
pub const GD_USERNAME: &str = "GD_USERNAME";
/// Google Domains: dyndns password
pub const GD_PASSWORD: &str = "GD_PASSWORD";

/// Cloudflare: record name
pub const CF_HOSTNAME: &str = "CF_HOSTNAME";
/// Cloudflare: API token
pub const CF_TOKEN: &str = "CF_TOKEN";
/// Cloudflare: zone identifier
pub const CF_ZONE_ID: &str = "CF_ZONE_ID";
/// Cloudflare: record type (optional, defaults to `A`)
pub const CF_RECORD_TYPE: &str = "CF_RECORD_TYPE";

/// Zyxel modem: base URL, e.g. `http://192.168.1.1`
pub const ZYXEL_URL: &str = "ZYXEL_URL";
/// Zyxel modem: admin username
pub const ZYXEL_USERNAME: &str = "ZYXEL_USERNAME";
/// Zyxel modem: admin password
pub const ZYXEL_PASSWORD: &str = "ZYXEL_PASSWORD";

const REDACTED: &str = "<REDACTED>";

/// Main DDNS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DdnsConfig {
    /// How to find the public address
    #[serde(default)]
    pub discoverer: DiscovererConfig,

    /// Updaters to run, in order
    #[serde(default)]
    pub updaters: Vec<UpdaterConfig>,
}

impl DdnsConfig {
    /// Build a configuration from named values
    ///
    /// Updaters are collected in a fixed order: Google Domains first, then
    /// Cloudflare. The Zyxel discoverer replaces the OpenDNS default when its
    /// key set is complete.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, crate::Error> {
        let discoverer = match key_set(vars, "zyxel", &[ZYXEL_URL, ZYXEL_USERNAME, ZYXEL_PASSWORD]) {
            Some(values) => DiscovererConfig::Zyxel {
                base_url: values[0].trim().to_string(),
                username: values[1].clone(),
                password: values[2].clone(),
            },
            None => DiscovererConfig::OpenDns,
        };

        let mut updaters = Vec::new();

        if let Some(values) = key_set(vars, "google_domains", &[GD_HOSTNAME, GD_USERNAME, GD_PASSWORD]) {
            updaters.push(UpdaterConfig::GoogleDomains {
                hostname: values[0].trim().to_string(),
                username: values[1].clone(),
                password: values[2].clone(),
            });
        }

        if let Some(values) = key_set(vars, "cloudflare", &[CF_HOSTNAME, CF_TOKEN, CF_ZONE_ID]) {
            let record_type = vars
                .get(CF_RECORD_TYPE)
                .map(|t| t.trim().to_ascii_uppercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_record_type);

            updaters.push(UpdaterConfig::Cloudflare {
                record_name: values[0].trim().to_string(),
                api_token: values[1].clone(),
                zone_id: values[2].trim().to_string(),
                record_type,
            });
        }

        let config = Self {
            discoverer,
            updaters,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.discoverer.validate()?;
        for updater in &self.updaters {
            updater.validate()?;
        }
        Ok(())
    }
}

/// Return the values of `keys` if every one of them is present and not blank.
/// A partially filled set is reported once and ignored.
///
/// Values come back untouched; credentials may legitimately contain spaces,
/// so only names and URLs are trimmed, by the caller.
fn key_set(vars: &HashMap<String, String>, provider: &str, keys: &[&str]) -> Option<Vec<String>> {
    let values: Vec<Option<String>> = keys
        .iter()
        .map(|k| {
            vars.get(*k)
                .filter(|v| !v.trim().is_empty())
                .cloned()
        })
        .collect();

    if values.iter().all(Option::is_some) {
        return Some(values.into_iter().flatten().collect());
    }

    if values.iter().any(Option::is_some) {
        let missing: Vec<&str> = keys
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();
        warn!(
            provider = provider,
            missing = ?missing,
            "Incomplete configuration, provider disabled"
        );
    }

    None
}

/// IP discoverer configuration
#[derive(Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscovererConfig {
    /// Ask OpenDNS what our address is
    #[default]
    OpenDns,

    /// Read the WAN address from a Zyxel modem status page
    Zyxel {
        /// Modem base URL, without trailing path
        base_url: String,
        /// Admin username
        username: String,
        /// Admin password
        password: String,
    },
}

impl DiscovererConfig {
    /// Validate the discoverer configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DiscovererConfig::OpenDns => Ok(()),
            DiscovererConfig::Zyxel {
                base_url,
                username,
                ..
            } => {
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "Zyxel base URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                if username.is_empty() {
                    return Err(crate::Error::config("Zyxel username cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the discoverer type name
    pub fn type_name(&self) -> &'static str {
        match self {
            DiscovererConfig::OpenDns => "opendns",
            DiscovererConfig::Zyxel { .. } => "zyxel",
        }
    }
}

impl fmt::Debug for DiscovererConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscovererConfig::OpenDns => f.write_str("OpenDns"),
            DiscovererConfig::Zyxel {
                base_url, username, ..
            } => f
                .debug_struct("Zyxel")
                .field("base_url", base_url)
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
        }
    }
}

/// Record updater configuration
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdaterConfig {
    /// Google Domains dynamic DNS endpoint
    GoogleDomains {
        /// Managed hostname
        hostname: String,
        /// Generated dyndns username
        username: String,
        /// Generated dyndns password
        password: String,
    },

    /// Cloudflare REST API
    Cloudflare {
        /// Cloudflare API token with Zone:DNS:Edit permissions
        api_token: String,
        /// Zone identifier
        zone_id: String,
        /// Fully-qualified record name
        record_name: String,
        /// Record type, `A` unless stated otherwise
        #[serde(default = "default_record_type")]
        record_type: String,
    },
}

impl UpdaterConfig {
    /// Validate the updater configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            UpdaterConfig::GoogleDomains {
                hostname,
                username,
                password,
            } => {
                if hostname.is_empty() || username.is_empty() || password.is_empty() {
                    return Err(crate::Error::config(
                        "Google Domains needs hostname, username and password",
                    ));
                }
                Ok(())
            }
            UpdaterConfig::Cloudflare {
                api_token,
                zone_id,
                record_name,
                record_type,
            } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if zone_id.is_empty() {
                    return Err(crate::Error::config("Cloudflare zone ID cannot be empty"));
                }
                if record_name.is_empty() {
                    return Err(crate::Error::config("Cloudflare record name cannot be empty"));
                }
                match record_type.as_str() {
                    "A" | "AAAA" => Ok(()),
                    other => Err(crate::Error::config(format!(
                        "Cloudflare record type '{}' is not supported. Supported types: A, AAAA",
                        other
                    ))),
                }
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            UpdaterConfig::GoogleDomains { .. } => "google_domains",
            UpdaterConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

impl fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdaterConfig::GoogleDomains {
                hostname, username, ..
            } => f
                .debug_struct("GoogleDomains")
                .field("hostname", hostname)
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            UpdaterConfig::Cloudflare {
                zone_id,
                record_name,
                record_type,
                ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &REDACTED)
                .field("zone_id", zone_id)
                .field("record_name", record_name)
                .field("record_type", record_type)
                .finish(),
        }
    }
}

fn default_record_type() -> String {
    "A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_means_opendns_and_no_updaters() {
        let config = DdnsConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.discoverer.type_name(), "opendns");
        assert!(config.updaters.is_empty());
    }

    #[test]
    fn complete_key_sets_enable_updaters_in_order() {
        let config = DdnsConfig::from_vars(&vars(&[
            (CF_HOSTNAME, "home.example.com"),
            (CF_TOKEN, "cf-token"),
            (CF_ZONE_ID, "zone-1"),
            (GD_HOSTNAME, "home.example.org"),
            (GD_USERNAME, "user"),
            (GD_PASSWORD, "pass"),
        ]))
        .unwrap();

        let names: Vec<&str> = config.updaters.iter().map(|u| u.type_name()).collect();
        assert_eq!(names, vec!["google_domains", "cloudflare"]);
    }

    #[test]
    fn partial_key_set_is_not_configured() {
        let config = DdnsConfig::from_vars(&vars(&[
            (CF_HOSTNAME, "home.example.com"),
            (CF_TOKEN, "cf-token"),
        ]))
        .unwrap();
        assert!(config.updaters.is_empty());
    }

    #[test]
    fn blank_values_count_as_absent() {
        let config = DdnsConfig::from_vars(&vars(&[
            (GD_HOSTNAME, "home.example.org"),
            (GD_USERNAME, "  "),
            (GD_PASSWORD, "pass"),
        ]))
        .unwrap();
        assert!(config.updaters.is_empty());
    }

    #[test]
    fn credentials_are_passed_through_untrimmed() {
        let config = DdnsConfig::from_vars(&vars(&[
            (GD_HOSTNAME, " home.example.org\n"),
            (GD_USERNAME, "user"),
            (GD_PASSWORD, " pass phrase "),
            (CF_HOSTNAME, "home.example.com"),
            (CF_TOKEN, "cf-token "),
            (CF_ZONE_ID, " zone-1"),
            (ZYXEL_URL, "http://192.168.1.1 "),
            (ZYXEL_USERNAME, "admin"),
            (ZYXEL_PASSWORD, "\tsecret"),
        ]))
        .unwrap();

        match &config.updaters[0] {
            UpdaterConfig::GoogleDomains {
                hostname, password, ..
            } => {
                assert_eq!(hostname, "home.example.org");
                assert_eq!(password, " pass phrase ");
            }
            other => panic!("unexpected updater: {other:?}"),
        }
        match &config.updaters[1] {
            UpdaterConfig::Cloudflare {
                api_token, zone_id, ..
            } => {
                assert_eq!(api_token, "cf-token ");
                assert_eq!(zone_id, "zone-1");
            }
            other => panic!("unexpected updater: {other:?}"),
        }
        match &config.discoverer {
            DiscovererConfig::Zyxel {
                base_url, password, ..
            } => {
                assert_eq!(base_url, "http://192.168.1.1");
                assert_eq!(password, "\tsecret");
            }
            other => panic!("unexpected discoverer: {other:?}"),
        }
    }

    #[test]
    fn cloudflare_record_type_defaults_to_a() {
        let config = DdnsConfig::from_vars(&vars(&[
            (CF_HOSTNAME, "home.example.com"),
            (CF_TOKEN, "cf-token"),
            (CF_ZONE_ID, "zone-1"),
        ]))
        .unwrap();

        match &config.updaters[0] {
            UpdaterConfig::Cloudflare { record_type, .. } => assert_eq!(record_type, "A"),
            other => panic!("unexpected updater: {other:?}"),
        }
    }

    #[test]
    fn unsupported_record_type_is_rejected() {
        let result = DdnsConfig::from_vars(&vars(&[
            (CF_HOSTNAME, "home.example.com"),
            (CF_TOKEN, "cf-token"),
            (CF_ZONE_ID, "zone-1"),
            (CF_RECORD_TYPE, "mx"),
        ]));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn zyxel_keys_replace_default_discoverer() {
        let config = DdnsConfig::from_vars(&vars(&[
            (ZYXEL_URL, "http://192.168.1.1"),
            (ZYXEL_USERNAME, "admin"),
            (ZYXEL_PASSWORD, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.discoverer.type_name(), "zyxel");
    }

    #[test]
    fn zyxel_url_needs_http_scheme() {
        let result = DdnsConfig::from_vars(&vars(&[
            (ZYXEL_URL, "192.168.1.1"),
            (ZYXEL_USERNAME, "admin"),
            (ZYXEL_PASSWORD, "secret"),
        ]));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let updater = UpdaterConfig::Cloudflare {
            api_token: "super-secret-token".into(),
            zone_id: "zone-1".into(),
            record_name: "home.example.com".into(),
            record_type: "A".into(),
        };
        let gd = UpdaterConfig::GoogleDomains {
            hostname: "home.example.org".into(),
            username: "user".into(),
            password: "hunter2".into(),
        };

        let text = format!("{updater:?} {gd:?}");
        assert!(!text.contains("super-secret-token"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("home.example.com"));
    }

    #[test]
    fn deserializes_tagged_json() {
        let config: DdnsConfig = serde_json::from_value(serde_json::json!({
            "discoverer": { "type": "open_dns" },
            "updaters": [
                {
                    "type": "cloudflare",
                    "api_token": "t",
                    "zone_id": "z",
                    "record_name": "home.example.com"
                }
            ]
        }))
        .unwrap();

        config.validate().unwrap();
        match &config.updaters[0] {
            UpdaterConfig::Cloudflare { record_type, .. } => assert_eq!(record_type, "A"),
            other => panic!("unexpected updater: {other:?}"),
        }
    }
}
