#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use chorus::config::{Credentials, GatewayConfig};
use chorus::providers::{EncodedRequest, ProviderRegistry, RawResponse};
use chorus::request::RawChatRequest;
use chorus::transport::Transport;
use chorus::{DomainError, Gateway, ProviderId};

pub const ANTHROPIC_HOST: &str = "api.anthropic.com";
pub const GOOGLE_HOST: &str = "generativelanguage.googleapis.com";
pub const GROQ_HOST: &str = "api.groq.com";

pub const ANTHROPIC_OK: &str = r#"{
  "id": "msg_01",
  "type": "message",
  "role": "assistant",
  "content": [{"type": "text", "text": "Hello from Claude"}],
  "stop_reason": "end_turn"
}"#;

pub const GOOGLE_OK: &str = r#"{
  "candidates": [{
    "content": {"role": "model", "parts": [{"text": "Hello from Gemini"}]},
    "finishReason": "STOP"
  }]
}"#;

pub const GROQ_OK: &str = r#"{
  "id": "chatcmpl-1",
  "choices": [{
    "index": 0,
    "message": {"role": "assistant", "content": "Hello from Llama"},
    "finish_reason": "stop"
  }]
}"#;

/// What the scripted transport does for a matching URL
#[derive(Debug, Clone)]
pub enum Script
{   Reply(u16, String)
  , Delayed(Duration, u16, String)
  , Fail(String)
  , Hang
}

/// In-memory transport answering by URL fragment
#[derive(Default)]
pub struct ScriptedTransport
{   scripts: Vec<(String, Script)>
  , seen: Mutex<Vec<EncodedRequest>>
}

impl ScriptedTransport
{   pub fn new() -> Self
    {   ScriptedTransport::default()
    }

    pub fn on(mut self, url_fragment: &str, script: Script) -> Self
    {   self.scripts.push((url_fragment.to_string(), script));
        self
    }

    pub fn reply(self, url_fragment: &str, status: u16, body: &str) -> Self
    {   self.on(url_fragment, Script::Reply(status, body.to_string()))
    }

    pub fn seen(&self) -> Vec<EncodedRequest>
    {   self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport
{   async fn send(&self, request: EncodedRequest)
      -> Result<RawResponse, DomainError>
    {   self.seen.lock().unwrap().push(request.clone());
        let script = self.scripts
          .iter()
          .find(|(fragment, _)| request.url.contains(fragment.as_str()))
          .map(|(_, script)| script.clone());
        match script
        {   Some(Script::Reply(status, body)) => Ok(RawResponse::new(status, body))
          , Some(Script::Delayed(delay, status, body)) => {
              tokio::time::sleep(delay).await;
              Ok(RawResponse::new(status, body))
            }
          , Some(Script::Fail(msg)) => Err(DomainError::upstream("connection refused", &msg))
          , Some(Script::Hang) => {
              tokio::time::sleep(Duration::from_secs(3600)).await;
              Err(DomainError::upstream("unreachable", ""))
            }
          , None => Ok(RawResponse::new(404, "not found"))
        }
    }
}

pub fn all_credentials() -> Credentials
{   Credentials::new()
      .with(ProviderId::ANTHROPIC, "sk-ant-test")
      .with(ProviderId::GOOGLE, "goog-test")
      .with(ProviderId::GROQ, "gsk-test")
}

pub fn gateway_with(
  config: GatewayConfig
, transport: Arc<ScriptedTransport>
, credentials: Credentials
) -> Gateway
{   let registry = ProviderRegistry::from_config(&config);
    Gateway::with_parts(config, registry, transport, credentials)
}

pub fn gateway(transport: Arc<ScriptedTransport>) -> Gateway
{   gateway_with(GatewayConfig::default(), transport, all_credentials())
}

pub fn raw(body: serde_json::Value) -> RawChatRequest
{   serde_json::from_value(body).unwrap()
}
