//! Configuration for chorus providers and request defaults

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::debug;

use crate::synthesis::SynthesisPolicy;
use crate::ProviderId;

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Provider id the adapter registers under
    pub id: ProviderId
  , /// Upstream model name
    pub model: String
  , /// API base URL (if custom)
    #[serde(default)]
    pub api_base: Option<String>
  , /// Largest completion the provider accepts
    pub max_tokens: u32
  , /// `anthropic-version` header override; Anthropic only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<String>
}

impl ProviderConfig
{   pub fn anthropic() -> Self
    {   ProviderConfig
        {   id: ProviderId::ANTHROPIC
          , model: "claude-3-5-sonnet-20241022".to_string()
          , api_base: None
          , max_tokens: 4096
          , anthropic_version: None
        }
    }

    pub fn google() -> Self
    {   ProviderConfig
        {   id: ProviderId::GOOGLE
          , model: "gemini-1.5-flash".to_string()
          , api_base: None
          , max_tokens: 8192
          , anthropic_version: None
        }
    }

    pub fn groq() -> Self
    {   ProviderConfig
        {   id: ProviderId::GROQ
          , model: "llama-3.3-70b-versatile".to_string()
          , api_base: None
          , max_tokens: 8192
          , anthropic_version: None
        }
    }
}

/// Values applied by the request normalizer when the caller omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults
{   /// Completion budget when `options.maxTokens` is absent
    pub max_tokens: u32
  , /// Upper clamp for any requested completion budget
    pub max_tokens_ceiling: u32
  , /// Sampling temperature when `options.creativity` is absent
    pub temperature: f32
}

impl Default for RequestDefaults
{   fn default() -> Self
    {   RequestDefaults
        {   max_tokens: 1024
          , max_tokens_ceiling: 4096
          , temperature: 0.7
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig
{   /// Provider configurations, in registration order
    pub providers: Vec<ProviderConfig>
  , /// Request defaults
    pub defaults: RequestDefaults
  , /// Providers used when the request names none
    pub default_providers: Vec<ProviderId>
  , /// How multi-provider answers are merged
    pub synthesis: SynthesisPolicy
  , /// Per-provider upstream timeout in seconds
    pub timeout_secs: u64
  , /// Answer a lone `ping` message with `pong`
    pub answer_ping: bool
}

impl Default for GatewayConfig
{   fn default() -> Self
    {   GatewayConfig
        {   providers: vec![
              ProviderConfig::anthropic()
            , ProviderConfig::google()
            , ProviderConfig::groq()
            ]
          , defaults: RequestDefaults::default()
          , default_providers: vec![ProviderId::ANTHROPIC]
          , synthesis: SynthesisPolicy::default()
          , timeout_secs: 30
          , answer_ping: true
        }
    }
}

impl GatewayConfig
{   /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading gateway config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let config: GatewayConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be at least 1".to_string()
            ));
        }
        if self.defaults.max_tokens_ceiling == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "max_tokens_ceiling must be at least 1".to_string()
            ));
        }
        if let Some(p) = self.providers.iter().find(|p| p.max_tokens == 0)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("max_tokens for {} must be at least 1", p.id)
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

/// Provider credentials, keyed by provider id.
///
/// Values are never printed; `Debug` lists only the configured ids.
#[derive(Clone, Default)]
pub struct Credentials
{   keys: HashMap<ProviderId, String>
}

impl Credentials
{   pub fn new() -> Self
    {   Credentials::default()
    }

    /// Builder-style insert; empty secrets are ignored
    pub fn with(mut self, provider: ProviderId, key: impl Into<String>) -> Self
    {   self.insert(provider, key);
        self
    }

    pub fn insert(&mut self, provider: ProviderId, key: impl Into<String>)
    {   let key = key.into();
        if key.trim().is_empty()
        {   debug!("Ignoring empty credential for {}", provider);
            return;
        }
        self.keys.insert(provider, key);
    }

    pub fn get(&self, provider: &ProviderId) -> Option<&str>
    {   self.keys.get(provider).map(String::as_str)
    }

    pub fn contains(&self, provider: &ProviderId) -> bool
    {   self.keys.contains_key(provider)
    }

    /// Read the built-in providers' keys from the process environment
    pub fn from_env() -> Self
    {   let var = |name: &str| std::env::var(name).ok();
        let mut creds = Credentials::new();
        if let Some(key) = var("ANTHROPIC_API_KEY")
        {   creds.insert(ProviderId::ANTHROPIC, key);
        }
        if let Some(key) = var("GOOGLE_API_KEY").or_else(|| var("GEMINI_API_KEY"))
        {   creds.insert(ProviderId::GOOGLE, key);
        }
        if let Some(key) = var("GROQ_API_KEY")
        {   creds.insert(ProviderId::GROQ, key);
        }
        debug!("Loaded credentials from environment: {:?}", creds);
        creds
    }
}

impl fmt::Debug for Credentials
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let mut ids: Vec<&ProviderId> = self.keys.keys().collect();
        ids.sort();
        f.debug_struct("Credentials")
          .field("configured", &ids)
          .finish()
    }
}
