use serde::{Deserialize, Serialize};
use log::trace;

use super::{parse_body, to_body, EncodedRequest, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::DomainError;
use crate::request::ChatRequest;
use crate::translate;
use crate::ProviderId;

const GROQ_API_BASE: &str
  = "https://api.groq.com/openai/v1";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f32
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== Adapter =====

/// Groq, speaking the OpenAI chat-completions dialect
pub struct GroqAdapter
{   model: String
  , api_base: String
  , max_tokens: u32
}

impl GroqAdapter
{   pub fn new(config: &ProviderConfig) -> Self
    {   GroqAdapter
        {   model: config.model.clone()
          , api_base: config.api_base.clone()
              .unwrap_or_else(|| GROQ_API_BASE.to_string())
          , max_tokens: config.max_tokens
        }
    }
}

impl ProviderAdapter for GroqAdapter
{   fn id(&self) -> ProviderId
    {   ProviderId::GROQ
    }

    fn label(&self) -> &str
    {   "Groq"
    }

    fn max_tokens(&self) -> u32
    {   self.max_tokens
    }

    fn encode(&self, request: &ChatRequest, api_key: &str)
      -> Result<EncodedRequest, DomainError>
    {   let system = request.options.system_prompt
          .iter()
          .map(|s| ChatMessage
            {   role: "system".to_string()
              , content: Some(s.clone())
            });
        let turns = request.messages
          .iter()
          .map(|m| ChatMessage
            {   role: m.role.as_str().to_string()
              , content: Some(m.content.clone())
            });

        let wire = GroqChatRequest
        {   model: self.model.clone()
          , messages: system.chain(turns).collect()
          , max_tokens: self.clamp_tokens(request.options.max_tokens)
          , temperature: request.options.temperature
          , stream: false
        };
        trace!(
          "Groq request: model={} messages={}",
          wire.model, wire.messages.len()
        );

        Ok(EncodedRequest
        {   provider: self.label().to_string()
          , url: format!(
              "{}/chat/completions",
              self.api_base.trim_end_matches('/')
            )
          , headers: vec![
              ("Content-Type".to_string(), "application/json".to_string())
            , ("Authorization".to_string(), format!("Bearer {}", api_key))
            ]
          , body: to_body(self.label(), &wire)?
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, DomainError>
    {   let path = "choices[0].message.content";
        let response: GroqChatResponse
          = parse_body(self.label(), path, body)?;
        response.choices
          .into_iter()
          .next()
          .and_then(|c| c.message.content)
          .ok_or_else(|| {
            translate::translate_missing_field(self.label(), path, body)
          })
    }
}
