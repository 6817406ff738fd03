//! LLM provider adapters and their registry

pub mod anthropic;
pub mod google;
pub mod groq;

use std::sync::Arc;
use serde::de::DeserializeOwned;
use log::{debug, warn};

use crate::config::{GatewayConfig, ProviderConfig};
use crate::error::DomainError;
use crate::request::{ChatRequest, ProviderOutcome};
use crate::translate;
use crate::ProviderId;

// Re-export for convenience
pub use anthropic::AnthropicAdapter;
pub use google::GoogleAdapter;
pub use groq::GroqAdapter;

/// A provider request ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest
{   /// Label of the provider the request is for
    pub provider: String
  , pub url: String
  , pub headers: Vec<(String, String)>
  , pub body: serde_json::Value
}

impl EncodedRequest
{   /// URL with any `key=` query value masked, safe to log
    pub fn redacted_url(&self) -> String
    {   match self.url.split_once('?')
        {   None => self.url.clone()
          , Some((base, query)) => {
              let query: Vec<String> = query
                .split('&')
                .map(|pair| match pair.split_once('=')
                  {   Some(("key", _)) => "key=***".to_string()
                    , _ => pair.to_string()
                  })
                .collect();
              format!("{}?{}", base, query.join("&"))
            }
        }
    }

    pub fn header(&self, name: &str) -> Option<&str>
    {   self.headers
          .iter()
          .find(|(k, _)| k.eq_ignore_ascii_case(name))
          .map(|(_, v)| v.as_str())
    }
}

/// An upstream answer before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse
{   pub status: u16
  , pub body: String
}

impl RawResponse
{   pub fn new(status: u16, body: impl Into<String>) -> Self
    {   RawResponse
        {   status
          , body: body.into()
        }
    }

    pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}

/// Translation unit between the generic chat shape and one provider.
///
/// Implementors supply `encode` and `extract_text`; `decode` turns any
/// upstream answer into an outcome and never fails.
pub trait ProviderAdapter: Send + Sync
{   fn id(&self) -> ProviderId;

    /// Human-readable name, e.g. "Anthropic"
    fn label(&self) -> &str;

    /// Largest completion budget this provider accepts
    fn max_tokens(&self) -> u32;

    fn encode(&self, request: &ChatRequest, api_key: &str)
      -> Result<EncodedRequest, DomainError>;

    /// Pull the answer text out of a success body
    fn extract_text(&self, body: &str) -> Result<String, DomainError>;

    fn decode(&self, response: &RawResponse) -> ProviderOutcome
    {   let result = if response.is_success()
        {   self.extract_text(&response.body)
        } else
        {   Err(translate::translate_status(
              self.label(),
              response.status,
              &response.body
            ))
        };
        match result
        {   Ok(text) => ProviderOutcome::ok(self.id(), self.label(), text)
          , Err(e) => ProviderOutcome::failed(self.id(), self.label(), e)
        }
    }

    /// Completion budget after the provider's own clamp
    fn clamp_tokens(&self, requested: u32) -> u32
    {   requested.clamp(1, self.max_tokens().max(1))
    }
}

/// Parse a success body into the provider's typed response.
///
/// Non-JSON is reported separately from JSON of the wrong shape.
pub(crate) fn parse_body<T: DeserializeOwned>(
  label: &str
, path: &str
, body: &str
) -> Result<T, DomainError>
{   let value: serde_json::Value = serde_json::from_str(body)
      .map_err(|_| translate::translate_non_json(label, body))?;
    serde_json::from_value(value)
      .map_err(|_| translate::translate_missing_field(label, path, body))
}

/// Serialize a typed wire request
pub(crate) fn to_body<T: serde::Serialize>(label: &str, wire: &T)
  -> Result<serde_json::Value, DomainError>
{   serde_json::to_value(wire).map_err(|e| {
      DomainError::new(
        crate::ErrorKind::BadRequest
      , format!("Failed to encode {} request", label)
      , e.to_string()
      )
    })
}

/// Adapters by provider id, in registration order
#[derive(Clone, Default)]
pub struct ProviderRegistry
{   adapters: Vec<Arc<dyn ProviderAdapter>>
}

impl ProviderRegistry
{   pub fn new() -> Self
    {   ProviderRegistry::default()
    }

    /// Build the built-in adapters named in `config`
    pub fn from_config(config: &GatewayConfig) -> Self
    {   let mut registry = ProviderRegistry::new();
        for provider in &config.providers
        {   match builtin_adapter(provider)
            {   Some(adapter) => registry.register(adapter)
              , None => warn!(
                  "No built-in adapter for provider '{}', skipping",
                  provider.id
                )
            }
        }
        registry
    }

    /// Add `adapter`, replacing any adapter with the same id
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>)
    {   let id = adapter.id();
        debug!("Registering adapter for {}", id);
        match self.adapters.iter().position(|a| a.id() == id)
        {   Some(idx) => self.adapters[idx] = adapter
          , None => self.adapters.push(adapter)
        }
    }

    pub fn get(&self, id: &ProviderId) -> Option<Arc<dyn ProviderAdapter>>
    {   self.adapters.iter().find(|a| &a.id() == id).cloned()
    }

    pub fn contains(&self, id: &ProviderId) -> bool
    {   self.adapters.iter().any(|a| &a.id() == id)
    }

    pub fn ids(&self) -> Vec<ProviderId>
    {   self.adapters.iter().map(|a| a.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProviderAdapter>>
    {   self.adapters.iter()
    }
}

fn builtin_adapter(config: &ProviderConfig) -> Option<Arc<dyn ProviderAdapter>>
{   if config.id == ProviderId::ANTHROPIC
    {   Some(Arc::new(AnthropicAdapter::new(config)))
    } else if config.id == ProviderId::GOOGLE
    {   Some(Arc::new(GoogleAdapter::new(config)))
    } else if config.id == ProviderId::GROQ
    {   Some(Arc::new(GroqAdapter::new(config)))
    } else
    {   None
    }
}
