use std::fmt;

/// Upper bound on the diagnostic detail carried by a `DomainError`
pub const MAX_DETAIL_CHARS: usize = 200;

/// Classification of every failure a chat request can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{   /// Caller sent a payload that cannot be served
    InvalidRequest
  , /// No credential (or no adapter) for a requested provider
    ProviderNotConfigured
  , /// Upstream rejected the credential (HTTP 401)
    AuthFailed
  , /// Upstream rate limit hit (HTTP 429)
    RateLimited
  , /// Upstream rejected the encoded payload (HTTP 400)
    BadRequest
  , /// Upstream answered, but not in the expected shape
    UpstreamFormatError
  , /// Any other upstream or transport failure
    UpstreamError
}

impl ErrorKind
{   /// HTTP status the surrounding handler answers with
    pub fn http_status(&self) -> u16
    {   match self
        {   ErrorKind::InvalidRequest => 400
          , ErrorKind::AuthFailed => 401
          , ErrorKind::RateLimited => 429
          , _ => 500
        }
    }

    /// Short caller-facing summary
    pub fn summary(&self) -> &'static str
    {   match self
        {   ErrorKind::InvalidRequest => "Invalid request"
          , ErrorKind::ProviderNotConfigured => {
              "Provider not configured"
            }
          , ErrorKind::AuthFailed => {
              "Authentication failed. Please check the provider API key."
            }
          , ErrorKind::RateLimited => {
              "Rate limit exceeded. Please try again later."
            }
          , ErrorKind::BadRequest => "Invalid request format."
          , ErrorKind::UpstreamFormatError => {
              "Unexpected response format from provider"
            }
          , ErrorKind::UpstreamError => "Server error"
        }
    }
}

impl fmt::Display for ErrorKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   ErrorKind::InvalidRequest => "InvalidRequest"
          , ErrorKind::ProviderNotConfigured => "ProviderNotConfigured"
          , ErrorKind::AuthFailed => "AuthFailed"
          , ErrorKind::RateLimited => "RateLimited"
          , ErrorKind::BadRequest => "BadRequest"
          , ErrorKind::UpstreamFormatError => "UpstreamFormatError"
          , ErrorKind::UpstreamError => "UpstreamError"
        };
        f.write_str(name)
    }
}

/// A classified failure, either for the whole request or one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError
{   pub kind: ErrorKind
  , pub message: String
  , /// Upstream body or message, at most `MAX_DETAIL_CHARS` chars
    pub raw_detail: String
}

impl DomainError
{   pub fn new(
      kind: ErrorKind
    , message: impl Into<String>
    , raw_detail: impl AsRef<str>
    ) -> Self
    {   DomainError
        {   kind
          , message: message.into()
          , raw_detail: truncate_detail(raw_detail.as_ref())
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self
    {   let message = message.into();
        DomainError::new(ErrorKind::InvalidRequest, message.clone(), message)
    }

    pub fn not_configured(provider: &str) -> Self
    {   DomainError::new(
          ErrorKind::ProviderNotConfigured
        , format!("No API key configured for {}", provider)
        , format!("missing credential for provider '{}'", provider)
        )
    }

    pub fn format_error(message: impl Into<String>, raw: &str) -> Self
    {   DomainError::new(ErrorKind::UpstreamFormatError, message, raw)
    }

    pub fn upstream(message: impl Into<String>, raw: &str) -> Self
    {   DomainError::new(ErrorKind::UpstreamError, message, raw)
    }
}

impl fmt::Display for DomainError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DomainError {}

/// Cut `raw` down to `MAX_DETAIL_CHARS` characters on a char boundary
pub fn truncate_detail(raw: &str) -> String
{   match raw.char_indices().nth(MAX_DETAIL_CHARS)
    {   Some((idx, _)) => raw[..idx].to_string()
      , None => raw.to_string()
    }
}

/// Errors from the gateway plumbing rather than from a chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Invalid configuration
    InvalidConfiguration(String)
  , /// Reading configuration from disk failed
    Io(String)
  , /// The backend task is gone
    BackendDisconnected
  , /// Timeout waiting on the backend
    Timeout
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::BackendDisconnected => {
              write!(f, "Gateway backend disconnected")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::InvalidConfiguration(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}
