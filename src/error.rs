//! Error types for Form Relay.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification channel errors.
///
/// Only transport failures are errors here: a channel that answers with a
/// non-success status still produces a `DispatchOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} request failed: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} response could not be read: {reason}")]
    ResponseUnreadable { name: String, reason: String },
}

/// Failures of an external lookup call (identity provider or issuer directory).
///
/// These never leave the lookup wrappers as errors; they are folded into
/// `Lookup::Unavailable`.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{service} request failed: {reason}")]
    Transport { service: String, reason: String },

    #[error("{service} returned HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("{service} returned an unparseable payload: {reason}")]
    Decode { service: String, reason: String },

    #[error("{service} answered without usable data: {reason}")]
    Unusable { service: String, reason: String },
}
