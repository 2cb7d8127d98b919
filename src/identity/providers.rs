//! The three network-identity providers, in their own wire formats.
//!
//! Each provider only maps its payload into a `ProviderRecord`; operator
//! cleanup and country localization happen once, in the resolver.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::LookupError;
use crate::identity::{IdentityProvider, ProviderRecord};
use crate::lookup::{Lookup, fetch_json};

// ── Provider A: ipinfo ──────────────────────────────────────────────

/// ipinfo.io. Considered the most accurate, so it is asked first.
pub struct IpInfoProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl IpInfoProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
        }
    }

    fn lookup_url(&self, address: &str) -> String {
        format!("{}/{address}/json", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    org: Option<String>,
    country: Option<String>,
}

#[async_trait]
impl IdentityProvider for IpInfoProvider {
    fn name(&self) -> &str {
        "ipinfo"
    }

    async fn lookup(&self, address: &str) -> Lookup<ProviderRecord> {
        let mut request = self.client.get(self.lookup_url(address));
        if let Some(token) = &self.token {
            request = request.query(&[("token", token.expose_secret())]);
        }

        let result = fetch_json::<IpInfoResponse>(request, self.name(), true)
            .await
            .and_then(|d| {
                ProviderRecord {
                    operator: d.org,
                    country_code: d.country.clone(),
                    country: d.country,
                }
                .usable(self.name())
            });
        result.into()
    }
}

// ── Provider B: ipwho.is ────────────────────────────────────────────

/// ipwho.is. Reports failure in-band through `success`.
pub struct IpWhoIsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpWhoIsProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn lookup_url(&self, address: &str) -> String {
        format!("{}/{address}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct IpWhoIsResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    connection: Option<IpWhoIsConnection>,
}

#[derive(Debug, Deserialize)]
struct IpWhoIsConnection {
    org: Option<String>,
    isp: Option<String>,
}

#[async_trait]
impl IdentityProvider for IpWhoIsProvider {
    fn name(&self) -> &str {
        "ipwhois"
    }

    async fn lookup(&self, address: &str) -> Lookup<ProviderRecord> {
        let request = self.client.get(self.lookup_url(address));

        let result = fetch_json::<IpWhoIsResponse>(request, self.name(), false)
            .await
            .and_then(|d| {
                if !d.success {
                    return Err(LookupError::Unusable {
                        service: self.name().to_string(),
                        reason: d.message.unwrap_or_else(|| "success=false".into()),
                    });
                }
                let operator = d.connection.and_then(|c| c.org.or(c.isp));
                ProviderRecord {
                    operator,
                    country_code: d.country_code,
                    country: d.country,
                }
                .usable(self.name())
            });
        result.into()
    }
}

// ── Provider C: ip-api ──────────────────────────────────────────────

/// ip-api.com. Reports failure in-band through `status`.
pub struct IpApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn lookup_url(&self, address: &str) -> String {
        format!("{}/json/{address}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    isp: Option<String>,
}

#[async_trait]
impl IdentityProvider for IpApiProvider {
    fn name(&self) -> &str {
        "ip-api"
    }

    async fn lookup(&self, address: &str) -> Lookup<ProviderRecord> {
        let request = self
            .client
            .get(self.lookup_url(address))
            .query(&[("fields", "status,message,country,countryCode,isp")]);

        let result = fetch_json::<IpApiResponse>(request, self.name(), false)
            .await
            .and_then(|d| {
                if d.status.as_deref() != Some("success") {
                    return Err(LookupError::Unusable {
                        service: self.name().to_string(),
                        reason: d.message.unwrap_or_else(|| "status!=success".into()),
                    });
                }
                ProviderRecord {
                    operator: d.isp,
                    country_code: d.country_code,
                    country: d.country,
                }
                .usable(self.name())
            });
        result.into()
    }
}
