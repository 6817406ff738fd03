//! Classification of upstream failures into `ErrorKind`

use log::warn;

use crate::error::{truncate_detail, DomainError, ErrorKind};

/// Classify a non-success HTTP answer from `provider`.
///
/// The status alone picks the kind. The message prefers the upstream's
/// own `error.message` (or top-level `message`); the raw detail is the
/// body, bounded.
pub fn translate_status(provider: &str, status: u16, body: &str)
  -> DomainError
{   let kind = match status
    {   401 => ErrorKind::AuthFailed
      , 429 => ErrorKind::RateLimited
      , 400 => ErrorKind::BadRequest
      , _ => ErrorKind::UpstreamError
    };
    let message = match upstream_message(body)
    {   Some(msg) => format!("{} API error {}: {}", provider, status, msg)
      , None => format!("{} API error: {}", provider, status)
    };
    warn!("{} answered HTTP {} ({})", provider, status, kind);
    DomainError::new(kind, truncate_detail(&message), body)
}

/// A success status whose body is not JSON at all
pub fn translate_non_json(provider: &str, body: &str) -> DomainError
{   DomainError::format_error(
      format!("Invalid JSON response from {} API", provider)
    , body
    )
}

/// A JSON success body that lacks the expected text field
pub fn translate_missing_field(provider: &str, path: &str, body: &str)
  -> DomainError
{   DomainError::format_error(
      format!("Invalid response format from {} API: missing {}", provider, path)
    , body
    )
}

/// Transport-level failure: no HTTP answer was received
pub fn translate_transport(provider: &str, err: &str) -> DomainError
{   DomainError::upstream(
      format!("{} request failed", provider)
    , err
    )
}

fn upstream_message(body: &str) -> Option<String>
{   let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let nested = value
      .get("error")
      .and_then(|e| e.get("message"))
      .and_then(|m| m.as_str());
    let flat = value.get("message").and_then(|m| m.as_str());
    let plain = value.get("error").and_then(|e| e.as_str());
    nested.or(flat).or(plain).map(str::to_string)
}
