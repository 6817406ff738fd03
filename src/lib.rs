pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod normalize;
pub mod translate;
pub mod transport;
pub mod observe;
pub mod invoker;
pub mod synthesis;
pub mod response;
pub mod gateway;
pub mod client;
pub mod server;

use std::borrow::Cow;
use std::fmt;
use serde::{Deserialize, Serialize};

pub use client::GatewayBackend;
pub use config::{Credentials, GatewayConfig};
pub use error::{DomainError, Error, ErrorKind};
pub use gateway::{Gateway, ProbeReport};
pub use request::{ChatRequest, RawChatRequest, UnifiedResponse};
pub use synthesis::SynthesisPolicy;

/*

chorus: one chat-completion entry point in front of several LLM
providers. A request names one or more providers; each one gets its
own wire encoding, its own upstream call and its own outcome. With
more than one provider the outcomes are merged into one answer.

  raw body
    -> normalize   (validate, clamp, resolve providers)
    -> invoker     (adapter.encode -> transport -> adapter.decode, xN)
    -> translate   (per failed upstream call)
    -> synthesis   (only when N > 1)
    -> response    (one UnifiedResponse shape for every case)

*/

/// CHORUS API INTERFACE:

// ===== Complete =====

pub type CompleteReply = Result<UnifiedResponse, DomainError>;
pub type CompleteReplySender
  = tokio::sync::mpsc::UnboundedSender<CompleteReply>;

pub struct CompleteArgs
{   pub request: RawChatRequest
  , pub reply: CompleteReplySender
}

// ===== Probe =====

pub type ProbeReply = Vec<ProbeReport>;
pub type ProbeReplySender
  = tokio::sync::mpsc::UnboundedSender<ProbeReply>;

pub struct ProbeArgs
{   pub reply: ProbeReplySender
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== GatewayHand (sender side) =====

pub struct GatewayHand
{   pub complete_tx
      : tokio::sync::mpsc::UnboundedSender<CompleteArgs>
  , pub probe_tx
      : tokio::sync::mpsc::UnboundedSender<ProbeArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== GatewayFoot (receiver side) =====

pub struct GatewayFoot
{   pub complete_rx
      : tokio::sync::mpsc::UnboundedReceiver<CompleteArgs>
  , pub probe_rx
      : tokio::sync::mpsc::UnboundedReceiver<ProbeArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}

/// CHORUS STRUCTURES:

/// Identifier of an upstream provider.
///
/// Not a closed enum: any id with a registered adapter is valid.
/// The three built-in ids are provided as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(Cow<'static, str>);

impl ProviderId
{   /// Anthropic (Claude models)
    pub const ANTHROPIC: ProviderId
      = ProviderId(Cow::Borrowed("anthropic"));
    /// Google (AI Studio: Gemini)
    pub const GOOGLE: ProviderId
      = ProviderId(Cow::Borrowed("google"));
    /// Groq (OpenAI-compatible, hosts Llama and others)
    pub const GROQ: ProviderId
      = ProviderId(Cow::Borrowed("groq"));

    pub fn new(id: impl Into<String>) -> Self
    {   ProviderId(Cow::Owned(id.into().to_lowercase()))
    }

    /// Resolve a caller-supplied name, honouring the legacy aliases
    pub fn from_alias(name: &str) -> Self
    {   match name.trim().to_lowercase().as_str()
        {   "anthropic" | "claude" => ProviderId::ANTHROPIC
          , "google" | "gemini" => ProviderId::GOOGLE
          , "groq" | "grok" => ProviderId::GROQ
          , other => ProviderId::new(other)
        }
    }

    pub fn as_str(&self) -> &str
    {   &self.0
    }
}

impl fmt::Display for ProviderId
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(&self.0)
    }
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   User
  , Assistant
  , System
}

impl Role
{   /// Absent or unknown roles fall back to `User`
    pub fn parse(role: Option<&str>) -> Self
    {   match role.map(|r| r.trim().to_lowercase())
        {   Some(r) if r == "assistant" => Role::Assistant
          , Some(r) if r == "system" => Role::System
          , _ => Role::User
        }
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::User => "user"
          , Role::Assistant => "assistant"
          , Role::System => "system"
        }
    }
}
