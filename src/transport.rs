//! The network boundary every provider call goes through

use async_trait::async_trait;
use log::{error, trace};

use crate::error::DomainError;
use crate::providers::{EncodedRequest, RawResponse};
use crate::translate;

/// Sends one encoded request and returns the raw answer.
///
/// Any HTTP status is a successful send; only failing to get an
/// answer at all is an error.
#[async_trait]
pub trait Transport: Send + Sync
{   async fn send(&self, request: EncodedRequest)
      -> Result<RawResponse, DomainError>;
}

/// `reqwest`-backed transport sharing one connection pool.
///
/// Errors are reported without the request URL, which may carry a key.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport
{   http_client: reqwest::Client
}

impl HttpTransport
{   pub fn new() -> Self
    {   HttpTransport
        {   http_client: reqwest::Client::new()
        }
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn send(&self, request: EncodedRequest)
      -> Result<RawResponse, DomainError>
    {   let target = request.redacted_url();
        let mut builder = self.http_client
          .post(&request.url)
          .json(&request.body);
        for (name, value) in &request.headers
        {   builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
          .send()
          .await
          .map_err(|e| {
            let e = e.without_url();
            error!("HTTP error calling {}: {}", target, e);
            translate::translate_transport(&request.provider, &e.to_string())
          })?;

        let status = response.status().as_u16();
        trace!("Response status from {}: {}", target, status);

        let body = response
          .text()
          .await
          .map_err(|e| {
            let e = e.without_url();
            error!("Failed reading body from {}: {}", target, e);
            translate::translate_transport(&request.provider, &e.to_string())
          })?;

        Ok(RawResponse { status, body })
    }
}
