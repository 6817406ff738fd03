//! Unified request, outcome and response types for chorus

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::synthesis::SynthesisPolicy;
use crate::{ProviderId, Role};

// ===== Inbound (as decoded from the HTTP body) =====

/// Request body exactly as the caller sent it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChatRequest
{   /// Expected to be an array of `{role, content}` objects
    #[serde(default)]
    pub messages: Option<serde_json::Value>
  , #[serde(default)]
    pub options: Option<RawOptions>
  , /// Provider selection, list form
    #[serde(default)]
    pub providers: Option<Vec<String>>
  , /// Provider selection, single-name form
    #[serde(default)]
    pub ai: Option<String>
  , /// Provider selection, legacy single-name form
    #[serde(default)]
    pub model: Option<String>
}

/// Generation options as the caller sent them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptions
{   #[serde(default, alias = "max_tokens", alias = "length")]
    pub max_tokens: Option<f64>
  , /// 0..=100, mapped onto temperature 0.0..=1.0
    #[serde(default)]
    pub creativity: Option<f64>
  , #[serde(default, alias = "system")]
    pub system_prompt: Option<String>
  , /// Per-request override of the configured synthesis policy
    #[serde(default)]
    pub synthesis: Option<SynthesisPolicy>
}

// ===== Normalized =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: Role::User
          , content: content.into()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: Role::Assistant
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions
{   /// Already clamped into `[1, max_tokens_ceiling]`
    pub max_tokens: u32
  , /// Always within `[0.0, 1.0]`
    pub temperature: f32
  , pub system_prompt: Option<String>
}

/// A validated chat request; the only input the invoker accepts
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest
{   /// Conversation order; never empty, always opens with a user turn
    pub messages: Vec<ChatMessage>
  , pub options: ChatOptions
  , /// Caller order, no duplicates, never empty
    pub providers: Vec<ProviderId>
  , pub synthesis: Option<SynthesisPolicy>
}

// ===== Per-provider outcome =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus
{   Ok
  , Failed
}

/// Result of one provider call within one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutcome
{   pub provider: ProviderId
  , /// Human-readable provider name, used in synthesized text
    pub label: String
  , pub status: OutcomeStatus
  , pub text: Option<String>
  , pub error: Option<DomainError>
}

impl ProviderOutcome
{   pub fn ok(
      provider: ProviderId
    , label: impl Into<String>
    , text: impl Into<String>
    ) -> Self
    {   ProviderOutcome
        {   provider
          , label: label.into()
          , status: OutcomeStatus::Ok
          , text: Some(text.into())
          , error: None
        }
    }

    pub fn failed(
      provider: ProviderId
    , label: impl Into<String>
    , error: DomainError
    ) -> Self
    {   ProviderOutcome
        {   provider
          , label: label.into()
          , status: OutcomeStatus::Failed
          , text: None
          , error: Some(error)
        }
    }

    pub fn is_ok(&self) -> bool
    {   self.status == OutcomeStatus::Ok
    }
}

// ===== Outbound =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage
{   pub role: Role
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
}

/// The single response shape callers ever see on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResponse
{   pub choices: Vec<Choice>
}

impl UnifiedResponse
{   pub fn from_text(content: impl Into<String>) -> Self
    {   UnifiedResponse
        {   choices: vec![
              Choice
              {   message: ResponseMessage
                  {   role: Role::Assistant
                    , content: content.into()
                  }
              }
            ]
        }
    }

    /// Content of the first choice
    pub fn text(&self) -> Option<&str>
    {   self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Error body returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

impl From<&DomainError> for ErrorResponse
{   fn from(e: &DomainError) -> Self
    {   match e.kind
        {   crate::ErrorKind::InvalidRequest => ErrorResponse
            {   error: e.message.clone()
              , details: None
            }
          , _ => ErrorResponse
            {   error: e.kind.summary().to_string()
              , details: Some(format!("{} ({})", e.message, e.raw_detail))
            }
        }
    }
}
