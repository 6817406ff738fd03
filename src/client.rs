use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};

use crate::gateway::{Gateway, ProviderStatus};
use crate::request::RawChatRequest;
use crate::GatewayFoot;

/// Public API for the chorus backend - owns the task
pub struct GatewayBackend
{   hand: crate::GatewayHand
  , provider_status: BTreeMap<String, ProviderStatus>
  , _task_handle: tokio::task::JoinHandle<()>
}

impl GatewayBackend
{   /// Create and spawn a new backend around `gateway`.
    /// Returns immediately - spawns background task
    pub fn new(gateway: Gateway) -> Self
    {   debug!("Creating GatewayBackend with task ownership");

        let (complete_tx, complete_rx)
          = mpsc::unbounded_channel();
        let (probe_tx, probe_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let hand = crate::GatewayHand
        {   complete_tx
          , probe_tx
          , shutdown_tx
        };

        let foot = crate::GatewayFoot
        {   complete_rx
          , probe_rx
          , shutdown_rx
        };

        let provider_status = gateway.provider_status();
        let gateway = Arc::new(gateway);
        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, gateway).await
        });

        GatewayBackend
        {   hand
          , provider_status
          , _task_handle
        }
    }

    /// Configuration state of every registered provider
    pub fn provider_status(&self) -> &BTreeMap<String, ProviderStatus>
    {   &self.provider_status
    }

    /// Queue a chat request - returns almost immediately
    pub async fn complete(
      &self
    , request: RawChatRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::CompleteReply>,
        crate::error::Error
      >
    {   debug!("complete queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::CompleteArgs
        {   request
          , reply: reply_tx
        };

        self.hand.complete_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendDisconnected
          })?;

        Ok(reply_rx)
    }

    /// Queue a health probe - returns almost immediately
    pub async fn probe(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::ProbeReply>,
        crate::error::Error
      >
    {   debug!("probe queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::ProbeArgs
        {   reply: reply_tx
        };

        self.hand.probe_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendDisconnected
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(&self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down GatewayBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::ShutdownArgs
        {   reply: reply_tx
        };

        self.hand.shutdown_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::BackendDisconnected
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend shutdown timeout");
            Err(crate::error::Error::Timeout)
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only queues: every command's work runs in its own
/// task so one slow upstream never holds up the next request.
async fn run_backend_loop(
  foot: crate::GatewayFoot
, gateway: Arc<Gateway>
)
{   debug!("Starting GatewayBackend event loop");
    let GatewayFoot
    {   mut complete_rx
      , mut probe_rx
      , mut shutdown_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = complete_rx.recv() => {
          debug!("Received Complete");
          let gateway = Arc::clone(&gateway);
          tokio::spawn(async move {
            let result = gateway.complete(cmd.request).await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = probe_rx.recv() => {
          debug!("Received Probe");
          let gateway = Arc::clone(&gateway);
          tokio::spawn(async move {
            let _ = cmd.reply.send(gateway.probe().await);
          });
        }
      , Some(cmd) = shutdown_rx.recv() => {
          debug!("Received Shutdown");
          let _ = cmd.reply.send(Ok(()));
          info!("GatewayBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
