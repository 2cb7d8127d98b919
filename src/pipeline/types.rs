//! Shared types for the relay pipeline.

use chrono::{DateTime, Utc};

/// Fallback for a missing client address or user-agent.
pub const UNKNOWN_CLIENT: &str = "unknown";

// ── Submission ──────────────────────────────────────────────────────

/// A submitted form message, split into lines.
///
/// Owned by a single pipeline run and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    lines: Vec<String>,
}

impl Submission {
    /// Build a submission from raw text. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            lines: trimmed.lines().map(str::to_string).collect(),
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

// ── Client context ──────────────────────────────────────────────────

/// What is known about the requester, captured once at the request boundary.
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Peer address as seen by the listener.
    pub peer_address: Option<String>,
    /// Raw `X-Forwarded-For` header, when present.
    pub forwarded_for: Option<String>,
    pub user_agent: String,
    pub captured_at: DateTime<Utc>,
}

impl ClientContext {
    pub fn new(
        peer_address: Option<String>,
        forwarded_for: Option<String>,
        user_agent: Option<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            peer_address,
            forwarded_for,
            user_agent: user_agent
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
            captured_at,
        }
    }

    /// The address to report: first forwarded hop, else the peer, else `"unknown"`.
    pub fn address(&self) -> String {
        self.forwarded_for
            .as_deref()
            .and_then(|xff| xff.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .or(self.peer_address.as_deref())
            .unwrap_or(UNKNOWN_CLIENT)
            .to_string()
    }
}

// ── Formatted message ───────────────────────────────────────────────

/// Final notification body, plus an optional image to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    pub body: String,
    /// Issuer logo URL, when the scheme has a known asset.
    pub artifact_url: Option<String>,
}
