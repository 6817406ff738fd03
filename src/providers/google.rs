use serde::{Deserialize, Serialize};
use log::trace;

use super::{parse_body, to_body, EncodedRequest, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::{DomainError, ErrorKind};
use crate::request::ChatRequest;
use crate::translate;
use crate::{ProviderId, Role};

const GOOGLE_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";

/// Threshold applied to every safety category
pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Categories covered by the fixed safety settings
pub const SAFETY_CATEGORIES: [&str; 4] = [
  "HARM_CATEGORY_HARASSMENT"
, "HARM_CATEGORY_HATE_SPEECH"
, "HARM_CATEGORY_SEXUALLY_EXPLICIT"
, "HARM_CATEGORY_DANGEROUS_CONTENT"
];

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GooglePart
{   pub text: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleContent
{   #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<GooglePart>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   pub temperature: f32
  , pub max_output_tokens: u32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting
{   pub category: String
  , pub threshold: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleChatRequest
{   pub contents: Vec<GoogleContent>
  , pub generation_config: GenerationConfig
  , pub safety_settings: Vec<SafetySetting>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleContent>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleChatResponse
{   pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<GoogleContent>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== Adapter =====

/// Google Generative Language `generateContent`
pub struct GoogleAdapter
{   model: String
  , api_base: String
  , max_tokens: u32
}

impl GoogleAdapter
{   pub fn new(config: &ProviderConfig) -> Self
    {   GoogleAdapter
        {   model: config.model.clone()
          , api_base: config.api_base.clone()
              .unwrap_or_else(|| GOOGLE_API_BASE.to_string())
          , max_tokens: config.max_tokens
        }
    }

    fn safety_settings() -> Vec<SafetySetting>
    {   SAFETY_CATEGORIES
          .iter()
          .map(|category| SafetySetting
            {   category: category.to_string()
              , threshold: SAFETY_THRESHOLD.to_string()
            })
          .collect()
    }
}

impl ProviderAdapter for GoogleAdapter
{   fn id(&self) -> ProviderId
    {   ProviderId::GOOGLE
    }

    fn label(&self) -> &str
    {   "Google"
    }

    fn max_tokens(&self) -> u32
    {   self.max_tokens
    }

    fn encode(&self, request: &ChatRequest, api_key: &str)
      -> Result<EncodedRequest, DomainError>
    {   let wire = GoogleChatRequest
        {   contents: request.messages
              .iter()
              .map(|m| GoogleContent
                {   role: Some(match m.role
                    {   Role::Assistant => "model".to_string()
                      , _ => "user".to_string()
                    })
                  , parts: vec![GooglePart { text: m.content.clone() }]
                })
              .collect()
          , generation_config: GenerationConfig
            {   temperature: request.options.temperature
              , max_output_tokens: self.clamp_tokens(
                  request.options.max_tokens
                )
            }
          , safety_settings: GoogleAdapter::safety_settings()
          , system_instruction: request.options.system_prompt
              .as_ref()
              .map(|s| GoogleContent
                {   role: None
                  , parts: vec![GooglePart { text: s.clone() }]
                })
        };
        trace!(
          "Google request: model={} contents={}",
          self.model, wire.contents.len()
        );

        let mut url = reqwest::Url::parse(&format!(
          "{}/models/{}:generateContent",
          self.api_base.trim_end_matches('/'),
          self.model
        ))
        .map_err(|e| {
          DomainError::new(
            ErrorKind::ProviderNotConfigured
          , format!("Invalid {} API base URL", self.label())
          , e.to_string()
          )
        })?;
        url.query_pairs_mut().append_pair("key", api_key);

        Ok(EncodedRequest
        {   provider: self.label().to_string()
          , url: url.to_string()
          , headers: vec![
              ("Content-Type".to_string(), "application/json".to_string())
            ]
          , body: to_body(self.label(), &wire)?
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, DomainError>
    {   let path = "candidates[0].content.parts[0].text";
        let response: GoogleChatResponse
          = parse_body(self.label(), path, body)?;
        response.candidates
          .into_iter()
          .next()
          .and_then(|c| c.content)
          .and_then(|c| c.parts.into_iter().next())
          .map(|p| p.text)
          .ok_or_else(|| {
            translate::translate_missing_field(self.label(), path, body)
          })
    }
}
