//! Submission pipeline.
//!
//! Every submission flows through:
//! 1. `issuer::extract`: locate the card prefix, if any
//! 2. `IdentityResolver::resolve()`: requester network identity
//! 3. `IssuerDirectory::lookup()`: card issuer metadata
//! 4. `MessageFormatter::format()`: annotated body
//! 5. `Dispatcher::dispatch()`: delivery with RICH → PLAIN fallback
//!
//! Nothing is stored: each run ends with the dispatch outcome.

pub mod format;
pub mod relay;
pub mod types;

pub use format::MessageFormatter;
pub use relay::Relay;
pub use types::{ClientContext, FormattedMessage, Submission};
