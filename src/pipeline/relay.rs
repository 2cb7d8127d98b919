//! Pipeline orchestrator.
//!
//! Flow, strictly sequential within one submission:
//! 1. Extract the card prefix from the submission
//! 2. Resolve the requester's network identity
//! 3. Look up the card issuer (only when a prefix was found)
//! 4. Format the notification
//! 5. Dispatch it
//!
//! Runs share nothing but the read-only components held here.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::channels::{DispatchOutcome, Dispatcher, NotificationChannel, TelegramChannel};
use crate::config::RelayConfig;
use crate::identity::IdentityResolver;
use crate::issuer::extract::{BinPolicy, extract_bin};
use crate::issuer::{BinlistDirectory, IssuerDirectory};
use crate::pipeline::format::MessageFormatter;
use crate::pipeline::types::{ClientContext, Submission};

/// The enrichment-and-relay pipeline.
pub struct Relay {
    resolver: IdentityResolver,
    issuers: Arc<dyn IssuerDirectory>,
    formatter: MessageFormatter,
    dispatcher: Dispatcher,
    bin_policy: BinPolicy,
}

impl Relay {
    pub fn new(
        resolver: IdentityResolver,
        issuers: Arc<dyn IssuerDirectory>,
        formatter: MessageFormatter,
        dispatcher: Dispatcher,
        bin_policy: BinPolicy,
    ) -> Self {
        Self {
            resolver,
            issuers,
            formatter,
            dispatcher,
            bin_policy,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &RelayConfig) -> Self {
        let client = reqwest::Client::new();

        let channel: Arc<dyn NotificationChannel> = Arc::new(TelegramChannel::new(
            config.telegram_token.clone(),
            config.telegram_api_url.clone(),
            client.clone(),
        ));

        let resolver = IdentityResolver::from_config(config, client.clone());
        info!(providers = ?resolver.provider_names(), "Identity provider chain ready");

        Self::new(
            resolver,
            Arc::new(BinlistDirectory::new(client, config.binlist_url.clone())),
            MessageFormatter::new(config.utc_offset, config.logo_base_url.clone()),
            Dispatcher::new(channel, config.chat_id.clone()),
            config.bin_policy,
        )
    }

    /// Enrich and relay one submission. Enrichment never fails; the outcome
    /// is whatever the notification channel reported.
    pub async fn submit(&self, submission: &Submission, client: &ClientContext) -> DispatchOutcome {
        let span = info_span!("submission", id = %Uuid::new_v4());
        self.run(submission, client).instrument(span).await
    }

    async fn run(&self, submission: &Submission, client: &ClientContext) -> DispatchOutcome {
        let lines = submission.lines();
        info!(lines = lines.len(), "Relaying submission");

        let bin = extract_bin(lines, self.bin_policy);
        debug!(has_bin = bin.is_some(), "Card prefix extraction done");

        let identity = self.resolver.resolve(&client.address()).await;
        debug!(resolved = !identity.is_unknown(), "Identity resolution done");

        let issuer = match bin.as_deref() {
            Some(bin) => {
                let lookup = self.issuers.lookup(bin).await;
                debug!(found = lookup.is_found(), "Issuer lookup done");
                lookup.found()
            }
            None => None,
        };

        let message = self
            .formatter
            .format(lines, client, &identity, bin.as_deref(), issuer.as_ref());

        self.dispatcher.dispatch(&message).await
    }
}
