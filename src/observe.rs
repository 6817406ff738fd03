//! Observation hook called by the invoker around each provider call

use std::time::Duration;
use log::{debug, info, warn};

use crate::request::ProviderOutcome;
use crate::ProviderId;

/// Receives redacted facts about provider calls.
///
/// Implementations never see credentials, headers or payload text.
pub trait InvocationObserver: Send + Sync
{   fn on_dispatch(&self, provider: &ProviderId, redacted_url: &str, body_bytes: usize);

    fn on_outcome(&self, outcome: &ProviderOutcome, elapsed: Duration);
}

/// Forwards observations to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl InvocationObserver for LogObserver
{   fn on_dispatch(&self, provider: &ProviderId, redacted_url: &str, body_bytes: usize)
    {   debug!(
          "Dispatching to {} at {} ({} bytes)",
          provider, redacted_url, body_bytes
        );
    }

    fn on_outcome(&self, outcome: &ProviderOutcome, elapsed: Duration)
    {   match &outcome.error
        {   None => info!(
              "{} answered in {}ms ({} chars)",
              outcome.provider,
              elapsed.as_millis(),
              outcome.text.as_deref().map(|t| t.chars().count()).unwrap_or(0)
            )
          , Some(e) => warn!(
              "{} failed after {}ms: {}",
              outcome.provider,
              elapsed.as_millis(),
              e
            )
        }
    }
}
