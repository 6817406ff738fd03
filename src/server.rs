//! HTTP surface: `/api/chat` and `/api/health`

use std::sync::Arc;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, error};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::client::GatewayBackend;
use crate::error::DomainError;
use crate::request::{ErrorResponse, RawChatRequest};

#[derive(Clone)]
pub struct AppState
{   pub backend: Arc<GatewayBackend>
}

impl AppState
{   pub fn new(backend: GatewayBackend) -> Self
    {   AppState
        {   backend: Arc::new(backend)
        }
    }
}

pub fn build_router(state: AppState) -> Router
{   Router::new()
      .route(
        "/api/chat",
        post(chat).options(preflight).fallback(method_not_allowed)
      )
      .route(
        "/api/health",
        get(health)
          .post(health_probe)
          .options(preflight)
          .fallback(method_not_allowed)
      )
      .layer(cors_layer())
      .with_state(state)
}

fn cors_layer() -> CorsLayer
{   CorsLayer::new()
      .allow_origin(Any)
      .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
      .allow_headers([header::CONTENT_TYPE])
}

impl IntoResponse for DomainError
{   fn into_response(self) -> Response
    {   let status = StatusCode::from_u16(self.kind.http_status())
          .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

fn internal_error(message: &str) -> Response
{   (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(ErrorResponse
      {   error: "Server error".to_string()
        , details: Some(message.to_string())
      })
    ).into_response()
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Response
{   let request: RawChatRequest = match serde_json::from_slice(&body)
    {   Ok(request) => request
      , Err(e) => {
          debug!("Rejecting malformed body: {}", e);
          return DomainError::invalid_request("Invalid JSON body")
            .into_response();
        }
    };

    let mut reply_rx = match state.backend.complete(request).await
    {   Ok(rx) => rx
      , Err(e) => {
          error!("Could not queue chat request: {}", e);
          return internal_error(&e.to_string());
        }
    };

    match reply_rx.recv().await
    {   Some(Ok(response)) => (StatusCode::OK, Json(response)).into_response()
      , Some(Err(e)) => e.into_response()
      , None => {
          error!("Backend dropped the chat reply");
          internal_error("no reply from gateway backend")
        }
    }
}

fn health_body(state: &AppState) -> serde_json::Value
{   json!({
      "status": "ok",
      "timestamp": chrono::Utc::now().to_rfc3339(),
      "version": env!("CARGO_PKG_VERSION"),
      "providers": state.backend.provider_status(),
    })
}

async fn health(State(state): State<AppState>) -> Response
{   Json(health_body(&state)).into_response()
}

async fn health_probe(State(state): State<AppState>) -> Response
{   let mut body = health_body(&state);
    let probes = match state.backend.probe().await
    {   Ok(mut rx) => rx.recv().await.unwrap_or_default()
      , Err(e) => {
          error!("Could not queue probe: {}", e);
          return internal_error(&e.to_string());
        }
    };
    body["probes"] = json!(probes);
    Json(body).into_response()
}

async fn preflight() -> StatusCode
{   StatusCode::OK
}

async fn method_not_allowed() -> Response
{   (
      StatusCode::METHOD_NOT_ALLOWED,
      Json(ErrorResponse
      {   error: "Method not allowed".to_string()
        , details: None
      })
    ).into_response()
}
