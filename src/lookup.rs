//! Outcome type shared by every best-effort external call.
//!
//! A provider that fails is a value the caller has to handle, not an error
//! that bubbles up: enrichment never aborts a submission.

use crate::error::LookupError;

/// Result of a best-effort lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The service answered with usable data.
    Found(T),
    /// The service did not answer usefully (transport, status, decode or empty payload).
    Unavailable(LookupError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert into an `Option`, discarding the failure reason.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T, LookupError>> for Lookup<T> {
    fn from(result: Result<T, LookupError>) -> Self {
        match result {
            Ok(value) => Self::Found(value),
            Err(err) => Self::Unavailable(err),
        }
    }
}

/// Fetch a URL and decode its JSON body, mapping every failure mode to a `LookupError`.
///
/// When `require_success` is false the body is decoded regardless of HTTP
/// status, for services that report failure inside the payload.
pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
    require_success: bool,
) -> Result<T, LookupError> {
    let resp = request.send().await.map_err(|e| LookupError::Transport {
        service: service.to_string(),
        reason: e.to_string(),
    })?;

    let status = resp.status();
    if require_success && !status.is_success() {
        return Err(LookupError::Status {
            service: service.to_string(),
            status: status.as_u16(),
        });
    }

    resp.json::<T>().await.map_err(|e| LookupError::Decode {
        service: service.to_string(),
        reason: e.to_string(),
    })
}
