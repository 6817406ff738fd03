//! Drives the provider adapters for one chat request

use std::sync::Arc;
use std::time::{Duration, Instant};
use futures::future::join_all;
use log::debug;

use crate::config::Credentials;
use crate::error::DomainError;
use crate::observe::{InvocationObserver, LogObserver};
use crate::providers::ProviderRegistry;
use crate::request::{ChatRequest, ProviderOutcome};
use crate::transport::Transport;
use crate::ProviderId;

/// Fans a request out to its providers and collects every outcome.
///
/// Failures stay inside their own `ProviderOutcome`; `invoke` itself
/// cannot fail. No retries are made.
#[derive(Clone)]
pub struct Invoker
{   registry: ProviderRegistry
  , transport: Arc<dyn Transport>
  , credentials: Credentials
  , timeout: Duration
  , observer: Arc<dyn InvocationObserver>
}

impl Invoker
{   pub fn new(
      registry: ProviderRegistry
    , transport: Arc<dyn Transport>
    , credentials: Credentials
    , timeout: Duration
    ) -> Self
    {   Invoker
        {   registry
          , transport
          , credentials
          , timeout
          , observer: Arc::new(LogObserver)
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self
    {   self.observer = observer;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry
    {   &self.registry
    }

    pub fn credentials(&self) -> &Credentials
    {   &self.credentials
    }

    /// One outcome per requested provider, in the caller's order.
    ///
    /// With several providers all calls run concurrently and every one
    /// is awaited to completion, whatever the others do.
    pub async fn invoke(&self, request: &ChatRequest) -> Vec<ProviderOutcome>
    {   match request.providers.as_slice()
        {   [single] => vec![self.invoke_one(request, single).await]
          , many => {
              debug!("Fanning out to {} providers", many.len());
              join_all(many.iter().map(|id| self.invoke_one(request, id)))
                .await
            }
        }
    }

    async fn invoke_one(&self, request: &ChatRequest, id: &ProviderId)
      -> ProviderOutcome
    {   let adapter = match self.registry.get(id)
        {   Some(adapter) => adapter
          , None => {
              return ProviderOutcome::failed(
                id.clone(),
                id.to_string(),
                DomainError::not_configured(id.as_str())
              );
            }
        };
        let label = adapter.label().to_string();

        let api_key = match self.credentials.get(id)
        {   Some(key) => key
          , None => {
              return ProviderOutcome::failed(
                id.clone(),
                label.clone(),
                DomainError::not_configured(&label)
              );
            }
        };

        let encoded = match adapter.encode(request, api_key)
        {   Ok(encoded) => encoded
          , Err(e) => return ProviderOutcome::failed(id.clone(), label, e)
        };

        self.observer.on_dispatch(
          id,
          &encoded.redacted_url(),
          encoded.body.to_string().len()
        );
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
          self.timeout,
          self.transport.send(encoded)
        ).await
        {   Ok(Ok(raw)) => adapter.decode(&raw)
          , Ok(Err(e)) => ProviderOutcome::failed(id.clone(), label, e)
          , Err(_) => {
              let message = format!(
                "{} request timed out after {}s",
                label,
                self.timeout.as_secs()
              );
              ProviderOutcome::failed(
                id.clone(),
                label,
                DomainError::upstream(message.clone(), &message)
              )
            }
        };

        self.observer.on_outcome(&outcome, started.elapsed());
        outcome
    }
}
