//! Card issuer enrichment.
//!
//! Given the first eight digits of a card number, the issuer directory
//! (binlist) describes the scheme, brand, type, country and issuing bank.
//! Every field of `IssuerRecord` is already normalized for display: absent
//! upstream values become `"?"` so the formatter never deals with gaps.

pub mod extract;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::lookup::{Lookup, fetch_json};

/// Placeholder rendered for any field the directory did not provide.
pub const MISSING: &str = "?";

const SERVICE: &str = "binlist";

/// Logo asset file names, keyed by lower-cased scheme.
const LOGO_ASSETS: &[(&str, &str)] = &[
    ("visa", "visa.png"),
    ("mastercard", "mastercard.png"),
    ("amex", "amex.png"),
    ("american express", "amex.png"),
    ("discover", "discover.png"),
    ("jcb", "jcb.png"),
    ("unionpay", "unionpay.png"),
    ("china union pay", "unionpay.png"),
    ("diners", "diners.png"),
    ("diners club", "diners.png"),
    ("maestro", "maestro.png"),
    ("mir", "mir.png"),
];

/// Issuer metadata for one card prefix, normalized for display.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerRecord {
    /// Card network, e.g. "visa".
    pub scheme: String,
    /// Debit / Credit, first letter capitalized.
    pub card_type: String,
    pub brand: String,
    pub prepaid: bool,
    pub country: IssuerCountry,
    /// Issuing bank name.
    pub bank: String,
    /// Expected card-number length, when known.
    pub number_length: Option<u32>,
    /// Whether numbers of this range pass a Luhn check.
    pub luhn: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuerCountry {
    pub name: String,
    /// Flag emoji, empty when unknown.
    pub emoji: String,
    /// (latitude, longitude)
    pub coordinates: Option<(f64, f64)>,
}

impl IssuerRecord {
    pub fn prepaid_label(&self) -> &'static str {
        if self.prepaid { "Yes" } else { "No" }
    }

    /// Country name, preceded by its flag when one is known.
    pub fn country_label(&self) -> String {
        if self.country.emoji.is_empty() {
            self.country.name.clone()
        } else {
            format!("{} {}", self.country.emoji, self.country.name)
        }
    }
}

/// Logo asset for a scheme, if one is known.
pub fn logo_asset(scheme: &str) -> Option<&'static str> {
    let key = scheme.trim().to_lowercase();
    LOGO_ASSETS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, asset)| *asset)
}

// ── Directory ───────────────────────────────────────────────────────

/// A source of issuer metadata keyed by card prefix.
#[async_trait]
pub trait IssuerDirectory: Send + Sync {
    /// Look up one 8-digit prefix. Never fails: any problem is `Unavailable`.
    async fn lookup(&self, bin: &str) -> Lookup<IssuerRecord>;
}

/// The binlist.net directory (API version 3).
pub struct BinlistDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl BinlistDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn lookup_url(&self, bin: &str) -> String {
        format!("{}/{bin}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl IssuerDirectory for BinlistDirectory {
    async fn lookup(&self, bin: &str) -> Lookup<IssuerRecord> {
        let request = self
            .client
            .get(self.lookup_url(bin))
            .header("Accept-Version", "3");

        let lookup: Lookup<BinlistResponse> = fetch_json(request, SERVICE, true).await.into();
        match lookup {
            Lookup::Found(payload) => {
                debug!("Issuer directory returned a record");
                Lookup::Found(payload.into_record())
            }
            Lookup::Unavailable(err) => {
                warn!(error = %err, "Issuer lookup unavailable");
                Lookup::Unavailable(err)
            }
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BinlistResponse {
    number: Option<BinlistNumber>,
    scheme: Option<String>,
    #[serde(rename = "type")]
    card_type: Option<String>,
    brand: Option<String>,
    prepaid: Option<bool>,
    country: Option<BinlistCountry>,
    bank: Option<BinlistBank>,
}

#[derive(Debug, Deserialize)]
struct BinlistNumber {
    length: Option<u32>,
    luhn: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct BinlistCountry {
    name: Option<String>,
    emoji: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BinlistBank {
    name: Option<String>,
}

impl BinlistResponse {
    fn into_record(self) -> IssuerRecord {
        let country = self.country;
        let coordinates = country
            .as_ref()
            .and_then(|c| Some((c.latitude?, c.longitude?)));
        let (country_name, emoji) = match country {
            Some(c) => (c.name, c.emoji),
            None => (None, None),
        };

        IssuerRecord {
            scheme: or_missing(self.scheme),
            card_type: capitalize_first(&or_missing(self.card_type)),
            brand: or_missing(self.brand),
            prepaid: self.prepaid.unwrap_or(false),
            country: IssuerCountry {
                name: or_missing(country_name),
                emoji: present(emoji).unwrap_or_default(),
                coordinates,
            },
            bank: or_missing(self.bank.and_then(|b| b.name)),
            number_length: self.number.as_ref().and_then(|n| n.length),
            luhn: self.number.and_then(|n| n.luhn).unwrap_or(false),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_missing(value: Option<String>) -> String {
    present(value).unwrap_or_else(|| MISSING.to_string())
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> IssuerRecord {
        serde_json::from_str::<BinlistResponse>(json)
            .unwrap()
            .into_record()
    }

    #[test]
    fn full_payload_is_normalized() {
        let record = parse(
            r#"{
                "number": {"length": 16, "luhn": true},
                "scheme": "visa",
                "type": "debit",
                "brand": "Visa/Dankort",
                "prepaid": false,
                "country": {"numeric": "208", "alpha2": "DK", "name": "Denmark",
                            "emoji": "🇩🇰", "currency": "DKK", "latitude": 56, "longitude": 10},
                "bank": {"name": "Jyske Bank", "url": "www.jyskebank.dk", "city": "Hjørring"}
            }"#,
        );
        assert_eq!(record.scheme, "visa");
        assert_eq!(record.card_type, "Debit");
        assert_eq!(record.brand, "Visa/Dankort");
        assert_eq!(record.prepaid_label(), "No");
        assert_eq!(record.country_label(), "🇩🇰 Denmark");
        assert_eq!(record.country.coordinates, Some((56.0, 10.0)));
        assert_eq!(record.bank, "Jyske Bank");
        assert_eq!(record.number_length, Some(16));
        assert!(record.luhn);
    }

    #[test]
    fn empty_payload_renders_placeholders() {
        let record = parse("{}");
        assert_eq!(record.scheme, MISSING);
        assert_eq!(record.card_type, MISSING);
        assert_eq!(record.brand, MISSING);
        assert_eq!(record.bank, MISSING);
        assert_eq!(record.country_label(), MISSING);
        assert_eq!(record.prepaid_label(), "No");
        assert_eq!(record.number_length, None);
        assert!(!record.luhn);
        assert!(record.country.emoji.is_empty());
        assert!(record.country.coordinates.is_none());
    }

    #[test]
    fn null_nested_fields_render_placeholders() {
        let record = parse(
            r#"{"scheme": "mastercard", "type": null, "prepaid": true,
                "country": {"name": null}, "bank": {}}"#,
        );
        assert_eq!(record.scheme, "mastercard");
        assert_eq!(record.card_type, MISSING);
        assert_eq!(record.prepaid_label(), "Yes");
        assert_eq!(record.country_label(), MISSING);
        assert_eq!(record.bank, MISSING);
    }

    #[test]
    fn no_field_renders_null_or_undefined() {
        let record = parse(r#"{"country": {}, "bank": null, "number": {}}"#);
        let rendered = [
            record.scheme.clone(),
            record.card_type.clone(),
            record.brand.clone(),
            record.country_label(),
            record.bank.clone(),
            record.prepaid_label().to_string(),
        ];
        for field in rendered {
            assert!(!field.is_empty());
            assert_ne!(field, "null");
            assert_ne!(field, "undefined");
        }
    }

    #[test]
    fn capitalize_handles_unicode_and_empty() {
        assert_eq!(capitalize_first("credit"), "Credit");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn logo_lookup_is_case_insensitive() {
        assert_eq!(logo_asset("Visa"), Some("visa.png"));
        assert_eq!(logo_asset("MASTERCARD"), Some("mastercard.png"));
        assert_eq!(logo_asset("American Express"), Some("amex.png"));
        assert_eq!(logo_asset("?"), None);
        assert_eq!(logo_asset("private label"), None);
    }

    #[test]
    fn lookup_url_joins_base_and_bin() {
        let dir = BinlistDirectory::new(reqwest::Client::new(), "https://lookup.binlist.net/");
        assert_eq!(dir.lookup_url("45391488"), "https://lookup.binlist.net/45391488");
    }

    #[tokio::test]
    async fn unreachable_directory_is_unavailable() {
        let dir = BinlistDirectory::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let lookup = dir.lookup("45391488").await;
        assert!(!lookup.is_found());
    }
}
