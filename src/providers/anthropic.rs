use serde::{Deserialize, Serialize};
use log::trace;

use super::{parse_body, to_body, EncodedRequest, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::DomainError;
use crate::request::ChatRequest;
use crate::translate;
use crate::{ProviderId, Role};

const ANTHROPIC_API_BASE: &str
  = "https://api.anthropic.com/v1";

/// Default value of the `anthropic-version` header
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicChatRequest
{   pub model: String
  , pub max_tokens: u32
  , pub messages: Vec<AnthropicMessage>
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicChatResponse
{   pub content: Vec<ContentBlock>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock
{   #[serde(rename = "type", default)]
    pub kind: Option<String>
  , #[serde(default)]
    pub text: Option<String>
}

// ===== Adapter =====

/// Anthropic Messages API
pub struct AnthropicAdapter
{   model: String
  , api_base: String
  , max_tokens: u32
  , version: String
}

impl AnthropicAdapter
{   pub fn new(config: &ProviderConfig) -> Self
    {   AnthropicAdapter
        {   model: config.model.clone()
          , api_base: config.api_base.clone()
              .unwrap_or_else(|| ANTHROPIC_API_BASE.to_string())
          , max_tokens: config.max_tokens
          , version: config.anthropic_version.clone()
              .unwrap_or_else(|| ANTHROPIC_VERSION.to_string())
        }
    }
}

impl ProviderAdapter for AnthropicAdapter
{   fn id(&self) -> ProviderId
    {   ProviderId::ANTHROPIC
    }

    fn label(&self) -> &str
    {   "Anthropic"
    }

    fn max_tokens(&self) -> u32
    {   self.max_tokens
    }

    fn encode(&self, request: &ChatRequest, api_key: &str)
      -> Result<EncodedRequest, DomainError>
    {   let wire = AnthropicChatRequest
        {   model: self.model.clone()
          , max_tokens: self.clamp_tokens(request.options.max_tokens)
          , messages: request.messages
              .iter()
              .map(|m| AnthropicMessage
                {   role: match m.role
                    {   Role::Assistant => "assistant".to_string()
                      , _ => "user".to_string()
                    }
                  , content: m.content.clone()
                })
              .collect()
          , temperature: request.options.temperature
          , system: request.options.system_prompt.clone()
        };
        trace!(
          "Anthropic request: model={} max_tokens={} messages={}",
          wire.model, wire.max_tokens, wire.messages.len()
        );

        Ok(EncodedRequest
        {   provider: self.label().to_string()
          , url: format!(
              "{}/messages",
              self.api_base.trim_end_matches('/')
            )
          , headers: vec![
              ("Content-Type".to_string(), "application/json".to_string())
            , ("x-api-key".to_string(), api_key.to_string())
            , ("anthropic-version".to_string(), self.version.clone())
            ]
          , body: to_body(self.label(), &wire)?
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, DomainError>
    {   let path = "content[0].text";
        let response: AnthropicChatResponse
          = parse_body(self.label(), path, body)?;
        response.content
          .into_iter()
          .next()
          .and_then(|block| block.text)
          .ok_or_else(|| {
            translate::translate_missing_field(self.label(), path, body)
          })
    }
}
