//! Validation and sanitizing of raw chat requests

use log::debug;
use serde_json::Value;

use crate::config::{GatewayConfig, RequestDefaults};
use crate::error::DomainError;
use crate::providers::ProviderRegistry;
use crate::request::{ChatMessage, ChatOptions, ChatRequest, RawChatRequest, RawOptions};
use crate::{ProviderId, Role};

/// Selection name that expands to every registered provider
const ALL_PROVIDERS: &str = "all";

/// Turns a raw body into a `ChatRequest`, or rejects it whole
#[derive(Debug, Clone)]
pub struct RequestNormalizer
{   defaults: RequestDefaults
  , default_providers: Vec<ProviderId>
}

impl RequestNormalizer
{   pub fn new(config: &GatewayConfig) -> Self
    {   RequestNormalizer
        {   defaults: config.defaults.clone()
          , default_providers: config.default_providers.clone()
        }
    }

    pub fn normalize(
      &self
    , raw: RawChatRequest
    , registry: &ProviderRegistry
    ) -> Result<ChatRequest, DomainError>
    {   let entries = match &raw.messages
        {   Some(Value::Array(entries)) => entries
          , _ => return Err(DomainError::invalid_request(
              "Invalid messages format"
            ))
        };
        let options = raw.options
          .as_ref()
          .ok_or_else(|| DomainError::invalid_request("Missing options"))?;

        let mut system_parts = Vec::new();
        let mut messages = Vec::new();
        for message in entries.iter().filter_map(parse_message)
        {   match message.role
            {   Role::System => system_parts.push(message.content)
              , _ => messages.push(message)
            }
        }

        match messages.first()
        {   None => {
              return Err(DomainError::invalid_request(
                "No valid messages to send"
              ));
            }
          , Some(first) if first.role != Role::User => {
              return Err(DomainError::invalid_request(
                "Conversation must start with a user message"
              ));
            }
          , Some(_) => {}
        }

        let providers = self.resolve_providers(&raw, registry)?;
        let options = self.options(options, system_parts);
        debug!(
          "Normalized request: {} messages, max_tokens={}, providers={:?}",
          messages.len(),
          options.max_tokens,
          providers
        );

        Ok(ChatRequest
        {   messages
          , synthesis: raw.options.and_then(|o| o.synthesis)
          , options
          , providers
        })
    }

    fn options(&self, raw: &RawOptions, system_parts: Vec<String>)
      -> ChatOptions
    {   let ceiling = self.defaults.max_tokens_ceiling.max(1);
        let max_tokens = match raw.max_tokens
        {   Some(n) if n.is_finite() => {
              n.round().clamp(1.0, ceiling as f64) as u32
            }
          , _ => self.defaults.max_tokens.clamp(1, ceiling)
        };

        let temperature = match raw.creativity
        {   Some(c) if c.is_finite() => (c / 100.0).clamp(0.0, 1.0) as f32
          , _ => self.defaults.temperature.clamp(0.0, 1.0)
        };

        let mut system: Vec<String> = raw.system_prompt
          .iter()
          .map(|s| s.trim())
          .filter(|s| !s.is_empty())
          .map(str::to_string)
          .collect();
        system.extend(system_parts);

        ChatOptions
        {   max_tokens
          , temperature
          , system_prompt: if system.is_empty()
            {   None
            } else
            {   Some(system.join("\n\n"))
            }
        }
    }

    fn resolve_providers(
      &self
    , raw: &RawChatRequest
    , registry: &ProviderRegistry
    ) -> Result<Vec<ProviderId>, DomainError>
    {   let names: Vec<String> = match (&raw.providers, &raw.ai, &raw.model)
        {   (Some(list), _, _) if !list.is_empty() => list.clone()
          , (_, Some(ai), _) => vec![ai.clone()]
          , (_, _, Some(model)) => vec![model.clone()]
          , _ => self.default_providers
              .iter()
              .map(|p| p.to_string())
              .collect()
        };

        let mut resolved: Vec<ProviderId> = Vec::new();
        for name in names
        {   let expanded = if name.trim().eq_ignore_ascii_case(ALL_PROVIDERS)
            {   registry.ids()
            } else
            {   vec![ProviderId::from_alias(&name)]
            };
            for id in expanded
            {   if !registry.contains(&id)
                {   return Err(DomainError::invalid_request(
                      format!("Unknown provider '{}'", name.trim())
                    ));
                }
                if !resolved.contains(&id)
                {   resolved.push(id);
                }
            }
        }

        if resolved.is_empty()
        {   return Err(DomainError::invalid_request(
              "No providers available"
            ));
        }
        Ok(resolved)
    }
}

/// One raw message, or `None` when it carries no usable content
fn parse_message(raw: &Value) -> Option<ChatMessage>
{   let role = Role::parse(raw.get("role").and_then(Value::as_str));
    let content = match raw.get("content")?
    {   Value::String(s) => s.trim().to_string()
      , Value::Number(n) => n.to_string()
      , Value::Bool(b) => b.to_string()
      , _ => return None
    };
    if content.is_empty()
    {   return None;
    }
    Some(ChatMessage { role, content })
}
