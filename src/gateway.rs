//! The chat-completion core: normalize, invoke, compose

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use log::{debug, info};

use crate::config::{Credentials, GatewayConfig};
use crate::error::DomainError;
use crate::invoker::Invoker;
use crate::normalize::RequestNormalizer;
use crate::observe::InvocationObserver;
use crate::providers::ProviderRegistry;
use crate::request::{ChatMessage, ChatOptions, ChatRequest, RawChatRequest, UnifiedResponse};
use crate::response::ResponseNormalizer;
use crate::transport::{HttpTransport, Transport};
use crate::ProviderId;

const PING: &str = "ping";
const PONG: &str = "pong";

/// Token budget of a health probe
const PROBE_MAX_TOKENS: u32 = 10;

/// Whether a provider can be called, as reported by the health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus
{   pub configured: bool
  , pub model: String
}

/// Result of probing one provider with a minimal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport
{   pub provider: ProviderId
  , pub status: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
}

/// Stateless request pipeline; one instance serves every request
pub struct Gateway
{   config: GatewayConfig
  , normalizer: RequestNormalizer
  , invoker: Invoker
  , responder: ResponseNormalizer
}

impl Gateway
{   /// Gateway over the built-in adapters and a real HTTP transport
    pub fn new(config: GatewayConfig, credentials: Credentials) -> Self
    {   let registry = ProviderRegistry::from_config(&config);
        Gateway::with_parts(
          config,
          registry,
          Arc::new(HttpTransport::new()),
          credentials
        )
    }

    pub fn with_parts(
      config: GatewayConfig
    , registry: ProviderRegistry
    , transport: Arc<dyn Transport>
    , credentials: Credentials
    ) -> Self
    {   debug!(
          "Building gateway for providers {:?} with {:?}",
          registry.ids(),
          credentials
        );
        Gateway
        {   normalizer: RequestNormalizer::new(&config)
          , invoker: Invoker::new(
              registry,
              transport,
              credentials,
              config.timeout()
            )
          , responder: ResponseNormalizer::new(config.synthesis)
          , config
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self
    {   self.invoker = self.invoker.with_observer(observer);
        self
    }

    /// Serve one chat request end to end.
    ///
    /// `Err` is either the request's own rejection or, for a
    /// single-provider request, that provider's failure.
    pub async fn complete(&self, raw: RawChatRequest)
      -> Result<UnifiedResponse, DomainError>
    {   let request = self.normalizer.normalize(raw, self.invoker.registry())?;

        if self.config.answer_ping && is_ping(&request)
        {   debug!("Answering ping without calling providers");
            return Ok(UnifiedResponse::from_text(PONG));
        }

        let outcomes = self.invoker.invoke(&request).await;
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
          "Invocation settled: {} ok, {} failed",
          outcomes.len() - failed,
          failed
        );
        self.responder.compose(outcomes, request.synthesis)
    }

    /// Configuration state of every registered provider
    pub fn provider_status(&self) -> BTreeMap<String, ProviderStatus>
    {   let registry = self.invoker.registry();
        registry
          .ids()
          .into_iter()
          .map(|id| {
            let model = self.config.providers
              .iter()
              .find(|p| p.id == id)
              .map(|p| p.model.clone())
              .unwrap_or_default();
            let status = ProviderStatus
            {   configured: self.invoker.credentials().contains(&id)
              , model
            };
            (id.to_string(), status)
          })
          .collect()
    }

    /// Call every configured provider with a minimal `Hello` request
    pub async fn probe(&self) -> Vec<ProbeReport>
    {   let credentials = self.invoker.credentials();
        let providers: Vec<ProviderId> = self.invoker
          .registry()
          .ids()
          .into_iter()
          .filter(|id| credentials.contains(id))
          .collect();
        if providers.is_empty()
        {   return vec![];
        }
        let request = ChatRequest
        {   messages: vec![ChatMessage::user("Hello")]
          , options: ChatOptions
            {   max_tokens: PROBE_MAX_TOKENS
              , temperature: self.config.defaults.temperature
              , system_prompt: None
            }
          , providers
          , synthesis: None
        };

        self.invoker
          .invoke(&request)
          .await
          .into_iter()
          .map(|outcome| ProbeReport
            {   status: (if outcome.is_ok() { "ok" } else { "error" }).to_string()
              , error: outcome.error.map(|e| e.message)
              , provider: outcome.provider
            })
          .collect()
    }
}

fn is_ping(request: &ChatRequest) -> bool
{   matches!(request.messages.as_slice(), [only] if only.content == PING)
}
