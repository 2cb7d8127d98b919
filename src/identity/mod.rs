//! Network identity of the requester: operator name and country.
//!
//! Providers are asked one after the other in a fixed order and the first
//! usable answer wins; providers are never queried concurrently.
//! The resolver never fails. When nobody answers it returns the
//! `IdentityResult::unknown()` sentinel.

pub mod countries;
pub mod providers;

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::LookupError;
use crate::lookup::Lookup;

pub use providers::{IpApiProvider, IpInfoProvider, IpWhoIsProvider};

/// Sentinel for an unresolved operator or country.
pub const UNKNOWN: &str = "unknown";

static AS_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^AS\d+\s+").unwrap());

/// Resolved identity of the requester, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResult {
    /// Network operator, without its autonomous-system prefix.
    pub operator: String,
    /// ISO 3166-1 alpha-2 code, or empty when unknown.
    pub country_code: String,
    /// Localized country name (or the provider's raw value).
    pub country: String,
}

impl IdentityResult {
    pub fn unknown() -> Self {
        Self {
            operator: UNKNOWN.to_string(),
            country_code: String::new(),
            country: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    /// Normalize a provider's answer into the common shape.
    fn from_record(record: ProviderRecord) -> Self {
        let operator = record
            .operator
            .map(|op| strip_as_prefix(&op))
            .filter(|op| !op.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let country_code = record.country_code.unwrap_or_default();
        let country = record
            .country
            .or_else(|| (!country_code.is_empty()).then(|| country_code.clone()))
            .map(|c| countries::display_country(&c))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            operator,
            country_code,
            country,
        }
    }
}

/// Raw answer of one provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRecord {
    pub operator: Option<String>,
    pub country_code: Option<String>,
    /// Country name or code, whichever the provider exposes.
    pub country: Option<String>,
}

impl ProviderRecord {
    /// Blank fields are dropped; a record with nothing left is unusable.
    pub fn usable(self, service: &str) -> Result<Self, LookupError> {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let record = Self {
            operator: clean(self.operator),
            country_code: clean(self.country_code),
            country: clean(self.country),
        };
        if record.operator.is_none() && record.country_code.is_none() && record.country.is_none() {
            return Err(LookupError::Unusable {
                service: service.to_string(),
                reason: "no operator or country in payload".into(),
            });
        }
        Ok(record)
    }
}

/// Remove a leading `AS<digits> ` autonomous-system tag from an operator name.
pub fn strip_as_prefix(operator: &str) -> String {
    AS_PREFIX.replace(operator.trim(), "").trim().to_string()
}

/// Parse a reported client address. A trailing port and IPv6 brackets are
/// accepted, as proxies put both in `X-Forwarded-For`.
pub fn parse_client_ip(address: &str) -> Option<IpAddr> {
    let address = address.trim();
    address
        .parse::<IpAddr>()
        .ok()
        .or_else(|| address.parse::<SocketAddr>().ok().map(|socket| socket.ip()))
        .or_else(|| address.strip_prefix('[')?.strip_suffix(']')?.parse().ok())
}

/// One source of network identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Single attempt, no retry.
    async fn lookup(&self, address: &str) -> Lookup<ProviderRecord>;
}

/// Ordered fallback chain of identity providers.
pub struct IdentityResolver {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl IdentityResolver {
    /// Providers are tried in the order given.
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }

    /// The production chain: ipinfo, then ipwho.is, then ip-api.
    pub fn from_config(config: &RelayConfig, client: reqwest::Client) -> Self {
        Self::new(vec![
            Arc::new(IpInfoProvider::new(
                client.clone(),
                config.ipinfo_url.clone(),
                config.ipinfo_token.clone(),
            )),
            Arc::new(IpWhoIsProvider::new(client.clone(), config.ipwhois_url.clone())),
            Arc::new(IpApiProvider::new(client, config.ipapi_url.clone())),
        ])
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve an address. Never fails.
    pub async fn resolve(&self, address: &str) -> IdentityResult {
        let Some(ip) = parse_client_ip(address) else {
            debug!("Client address is not an IP; skipping identity providers");
            return IdentityResult::unknown();
        };
        let ip = ip.to_string();

        for provider in &self.providers {
            match provider.lookup(&ip).await {
                Lookup::Found(record) => {
                    debug!(provider = provider.name(), "Identity resolved");
                    return IdentityResult::from_record(record);
                }
                Lookup::Unavailable(err) => {
                    warn!(provider = provider.name(), error = %err, "Identity provider did not answer");
                }
            }
        }

        warn!("No identity provider answered; using sentinel");
        IdentityResult::unknown()
    }
}
