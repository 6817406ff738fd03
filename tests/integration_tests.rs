mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use chorus::config::{Credentials, GatewayConfig, ProviderConfig};
use chorus::normalize::RequestNormalizer;
use chorus::observe::InvocationObserver;
use chorus::providers::{
  AnthropicAdapter, GoogleAdapter, GroqAdapter, ProviderAdapter, ProviderRegistry, RawResponse,
};
use chorus::request::{ChatMessage, ChatOptions, ChatRequest, ErrorResponse, ProviderOutcome};
use chorus::transport::HttpTransport;
use chorus::synthesis::POINTS_PREAMBLE;
use chorus::{ErrorKind, Gateway, GatewayBackend, ProviderId};

use common::*;

fn fixed_request(providers: Vec<ProviderId>) -> ChatRequest
{   ChatRequest
    {   messages: vec![
          ChatMessage::user("Hi")
        , ChatMessage::assistant("Hello! How can I help?")
        , ChatMessage::user("Tell me a joke")
        ]
      , options: ChatOptions
        {   max_tokens: 256
          , temperature: 0.5
          , system_prompt: Some("Be brief".to_string())
        }
      , providers
      , synthesis: None
    }
}

fn normalizer() -> (RequestNormalizer, ProviderRegistry)
{   let config = GatewayConfig::default();
    (RequestNormalizer::new(&config), ProviderRegistry::from_config(&config))
}

fn approx(value: &serde_json::Value, expected: f64) -> bool
{   (value.as_f64().unwrap() - expected).abs() < 1e-6
}

// ===== RequestNormalizer =====

#[test]
fn test_messages_filtering_to_empty_is_invalid()
{   let (normalizer, registry) = normalizer();
    let err = normalizer
      .normalize(
        raw(json!({
          "messages": [{"role": "user", "content": "   "}, {"role": "user"}],
          "options": {}
        })),
        &registry
      )
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    assert_eq!(err.kind.http_status(), 400);
}

#[test]
fn test_conversation_opening_with_assistant_is_invalid()
{   let (normalizer, registry) = normalizer();
    let err = normalizer
      .normalize(
        raw(json!({
          "messages": [
            {"role": "assistant", "content": "Hi, I'm a bot"},
            {"role": "user", "content": "Hello"}
          ],
          "options": {}
        })),
        &registry
      )
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    assert!(err.message.contains("user message"));
}

#[test]
fn test_missing_options_or_bad_messages_are_invalid()
{   let (normalizer, registry) = normalizer();
    let no_options = normalizer
      .normalize(raw(json!({"messages": [{"role": "user", "content": "hi"}]})), &registry)
      .unwrap_err();
    assert_eq!(no_options.message, "Missing options");

    let not_array = normalizer
      .normalize(raw(json!({"messages": "hi", "options": {}})), &registry)
      .unwrap_err();
    assert_eq!(not_array.message, "Invalid messages format");
}

#[test]
fn test_roles_default_to_user_and_content_is_trimmed()
{   let (normalizer, registry) = normalizer();
    let request = normalizer
      .normalize(
        raw(json!({
          "messages": [
            {"content": "  first  "},
            {"role": "robot", "content": 42},
            {"role": "assistant", "content": ""},
            {"role": "assistant", "content": {"nested": true}}
          ],
          "options": {}
        })),
        &registry
      )
      .unwrap();
    assert_eq!(
      request.messages,
      vec![ChatMessage::user("first"), ChatMessage::user("42")]
    );
}

#[test]
fn test_system_messages_are_lifted_into_system_prompt()
{   let (normalizer, registry) = normalizer();
    let request = normalizer
      .normalize(
        raw(json!({
          "messages": [
            {"role": "system", "content": "Answer in French"},
            {"role": "user", "content": "Hello"}
          ],
          "options": {"systemPrompt": "You are terse"}
        })),
        &registry
      )
      .unwrap();
    assert_eq!(request.messages.len(), 1);
    assert_eq!(
      request.options.system_prompt.as_deref(),
      Some("You are terse\n\nAnswer in French")
    );
}

#[test]
fn test_temperature_law()
{   let (normalizer, registry) = normalizer();
    let half = normalizer
      .normalize(
        raw(json!({
          "messages": [{"role": "user", "content": "hi"}],
          "options": {"creativity": 50}
        })),
        &registry
      )
      .unwrap();
    assert!((half.options.temperature - 0.5).abs() < 1e-6);

    let default = normalizer
      .normalize(
        raw(json!({"messages": [{"role": "user", "content": "hi"}], "options": {}})),
        &registry
      )
      .unwrap();
    assert!((default.options.temperature - 0.7).abs() < 1e-6);

    let zero = normalizer
      .normalize(
        raw(json!({
          "messages": [{"role": "user", "content": "hi"}],
          "options": {"creativity": 0}
        })),
        &registry
      )
      .unwrap();
    assert_eq!(zero.options.temperature, 0.0);
}

#[test]
fn test_provider_selection_aliases()
{   let (normalizer, registry) = normalizer();
    let base = json!({"messages": [{"role": "user", "content": "hi"}], "options": {}});

    let mut by_ai = base.clone();
    by_ai["ai"] = json!("Claude");
    let request = normalizer.normalize(raw(by_ai), &registry).unwrap();
    assert_eq!(request.providers, vec![ProviderId::ANTHROPIC]);

    let mut by_model = base.clone();
    by_model["model"] = json!("gemini");
    let request = normalizer.normalize(raw(by_model), &registry).unwrap();
    assert_eq!(request.providers, vec![ProviderId::GOOGLE]);

    let mut list = base.clone();
    list["providers"] = json!(["grok", "groq", "anthropic"]);
    let request = normalizer.normalize(raw(list), &registry).unwrap();
    assert_eq!(request.providers, vec![ProviderId::GROQ, ProviderId::ANTHROPIC]);

    let mut all = base.clone();
    all["providers"] = json!(["all"]);
    let request = normalizer.normalize(raw(all), &registry).unwrap();
    assert_eq!(
      request.providers,
      vec![ProviderId::ANTHROPIC, ProviderId::GOOGLE, ProviderId::GROQ]
    );

    let none = normalizer.normalize(raw(base.clone()), &registry).unwrap();
    assert_eq!(none.providers, vec![ProviderId::ANTHROPIC]);

    let mut unknown = base;
    unknown["ai"] = json!("mistral");
    let err = normalizer.normalize(raw(unknown), &registry).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    assert!(err.message.contains("mistral"));
}

// ===== Adapters =====

#[test]
fn test_clamp_law()
{   let (normalizer, registry) = normalizer();
    let adapter = AnthropicAdapter::new(&ProviderConfig::anthropic());
    for (requested, expected) in [(100_000.0, 4096), (0.0, 1), (-12.0, 1), (512.0, 512)]
    {   let request = normalizer
          .normalize(
            raw(json!({
              "messages": [{"role": "user", "content": "hi"}],
              "options": {"maxTokens": requested}
            })),
            &registry
          )
          .unwrap();
        let encoded = adapter.encode(&request, "k").unwrap();
        assert_eq!(encoded.body["max_tokens"], json!(expected), "requested {}", requested);
    }
}

#[test]
fn test_provider_maximum_applies_below_global_ceiling()
{   let mut config = GatewayConfig::default();
    config.defaults.max_tokens_ceiling = 100_000;
    let normalizer = RequestNormalizer::new(&config);
    let registry = ProviderRegistry::from_config(&config);
    let request = normalizer
      .normalize(
        raw(json!({
          "messages": [{"role": "user", "content": "hi"}],
          "options": {"length": 50_000}
        })),
        &registry
      )
      .unwrap();

    let google = GoogleAdapter::new(&ProviderConfig::google())
      .encode(&request, "k")
      .unwrap();
    assert_eq!(google.body["generationConfig"]["maxOutputTokens"], json!(8192));
    let anthropic = AnthropicAdapter::new(&ProviderConfig::anthropic())
      .encode(&request, "k")
      .unwrap();
    assert_eq!(anthropic.body["max_tokens"], json!(4096));
}

#[test]
fn test_anthropic_round_trip()
{   let adapter = AnthropicAdapter::new(&ProviderConfig::anthropic());
    let encoded = adapter.encode(&fixed_request(vec![ProviderId::ANTHROPIC]), "sk-ant").unwrap();

    assert_eq!(encoded.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(encoded.header("x-api-key"), Some("sk-ant"));
    assert_eq!(encoded.header("anthropic-version"), Some("2023-06-01"));
    assert_eq!(encoded.body["model"], json!("claude-3-5-sonnet-20241022"));
    assert_eq!(encoded.body["system"], json!("Be brief"));
    assert_eq!(encoded.body["messages"][1]["role"], json!("assistant"));
    assert!(approx(&encoded.body["temperature"], 0.5));

    let outcome = adapter.decode(&RawResponse::new(200, ANTHROPIC_OK));
    assert!(outcome.is_ok());
    assert_eq!(outcome.text.as_deref(), Some("Hello from Claude"));
}

#[test]
fn test_google_round_trip()
{   let adapter = GoogleAdapter::new(&ProviderConfig::google());
    let encoded = adapter.encode(&fixed_request(vec![ProviderId::GOOGLE]), "goog-secret").unwrap();

    assert!(encoded.url.ends_with("models/gemini-1.5-flash:generateContent?key=goog-secret"));
    assert!(!encoded.redacted_url().contains("goog-secret"));
    assert!(encoded.redacted_url().ends_with("key=***"));
    assert_eq!(encoded.body["contents"][0]["role"], json!("user"));
    assert_eq!(encoded.body["contents"][1]["role"], json!("model"));
    assert_eq!(encoded.body["contents"][2]["parts"][0]["text"], json!("Tell me a joke"));
    assert_eq!(encoded.body["generationConfig"]["maxOutputTokens"], json!(256));
    assert!(approx(&encoded.body["generationConfig"]["temperature"], 0.5));

    let safety = encoded.body["safetySettings"].as_array().unwrap();
    assert_eq!(safety.len(), 4);
    assert!(safety.iter().all(|s| s["threshold"] == json!("BLOCK_MEDIUM_AND_ABOVE")));

    let outcome = adapter.decode(&RawResponse::new(200, GOOGLE_OK));
    assert_eq!(outcome.text.as_deref(), Some("Hello from Gemini"));
}

#[test]
fn test_google_key_is_query_encoded()
{   let adapter = GoogleAdapter::new(&ProviderConfig::google());
    let encoded = adapter
      .encode(&fixed_request(vec![ProviderId::GOOGLE]), "a&b=c#d+e")
      .unwrap();

    assert!(encoded.url.ends_with(":generateContent?key=a%26b%3Dc%23d%2Be"));
    assert!(encoded.redacted_url().ends_with("?key=***"));
    assert_eq!(encoded.provider, "Google");
}

#[test]
fn test_anthropic_version_follows_config()
{   let adapter = AnthropicAdapter::new(&ProviderConfig::anthropic());
    let encoded = adapter.encode(&fixed_request(vec![ProviderId::ANTHROPIC]), "k").unwrap();
    assert_eq!(encoded.header("anthropic-version"), Some("2023-06-01"));

    let mut config = ProviderConfig::anthropic();
    config.anthropic_version = Some("2024-10-22".to_string());
    let encoded = AnthropicAdapter::new(&config)
      .encode(&fixed_request(vec![ProviderId::ANTHROPIC]), "k")
      .unwrap();
    assert_eq!(encoded.header("anthropic-version"), Some("2024-10-22"));
}

#[test]
fn test_groq_round_trip()
{   let adapter = GroqAdapter::new(&ProviderConfig::groq());
    let encoded = adapter.encode(&fixed_request(vec![ProviderId::GROQ]), "gsk").unwrap();

    assert_eq!(encoded.url, "https://api.groq.com/openai/v1/chat/completions");
    assert_eq!(encoded.header("authorization"), Some("Bearer gsk"));
    assert_eq!(encoded.body["stream"], json!(false));
    assert_eq!(encoded.body["max_tokens"], json!(256));
    assert_eq!(encoded.body["messages"][0]["role"], json!("system"));
    assert_eq!(encoded.body["messages"].as_array().unwrap().len(), 4);

    let outcome = adapter.decode(&RawResponse::new(200, GROQ_OK));
    assert_eq!(outcome.text.as_deref(), Some("Hello from Llama"));
}

#[test]
fn test_error_classification()
{   let adapter = AnthropicAdapter::new(&ProviderConfig::anthropic());
    let kind_for = |status: u16, body: &str| {
      adapter.decode(&RawResponse::new(status, body)).error.unwrap().kind
    };
    assert_eq!(
      kind_for(401, r#"{"error":{"message":"invalid x-api-key"}}"#),
      ErrorKind::AuthFailed
    );
    assert_eq!(kind_for(429, r#"{"error":{"message":"slow down"}}"#), ErrorKind::RateLimited);
    assert_eq!(kind_for(400, "{}"), ErrorKind::BadRequest);
    assert_eq!(kind_for(503, "overloaded"), ErrorKind::UpstreamError);
    assert_eq!(kind_for(200, "<html>oops</html>"), ErrorKind::UpstreamFormatError);
    assert_eq!(kind_for(200, r#"{"content": []}"#), ErrorKind::UpstreamFormatError);
}

#[test]
fn test_raw_detail_is_bounded()
{   let adapter = GroqAdapter::new(&ProviderConfig::groq());
    let body = format!(r#"{{"error":{{"message":"{}"}}}}"#, "x".repeat(5000));
    let error = adapter.decode(&RawResponse::new(500, body)).error.unwrap();
    assert!(error.raw_detail.chars().count() <= 200);
    assert!(error.message.chars().count() <= 200);
}

// ===== Invoker / Synthesizer through the gateway =====

#[tokio::test]
async fn test_fan_out_partial_failure()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .reply(ANTHROPIC_HOST, 500, r#"{"error":{"message":"internal"}}"#)
        .reply(GROQ_HOST, 200, r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
    );
    let response = gateway(transport)
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["anthropic", "groq"]
      })))
      .await
      .unwrap();

    let text = response.text().unwrap();
    assert!(text.contains("[Anthropic response unavailable]"));
    assert!(text.contains("ok"));
    assert_eq!(response.choices.len(), 1);
}

#[tokio::test]
async fn test_fan_out_total_failure_still_answers()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .reply(ANTHROPIC_HOST, 401, "{}")
        .reply(GOOGLE_HOST, 429, "{}")
        .on(GROQ_HOST, Script::Fail("connection reset".to_string()))
    );
    let response = gateway(transport)
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["all"]
      })))
      .await
      .unwrap();

    let text = response.text().unwrap();
    for marker in [
      "[Anthropic response unavailable]",
      "[Google response unavailable]",
      "[Groq response unavailable]",
    ]
    {   assert!(text.contains(marker), "missing {}", marker);
    }
}

#[tokio::test]
async fn test_single_provider_failure_is_returned_as_error()
{   let transport = Arc::new(
      ScriptedTransport::new().reply(ANTHROPIC_HOST, 429, r#"{"error":{"message":"rate"}}"#)
    );
    let err = gateway(transport)
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {}
      })))
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(err.kind.http_status(), 429);
}

#[tokio::test]
async fn test_outcomes_keep_caller_order_not_completion_order()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .on(
          ANTHROPIC_HOST,
          Script::Delayed(Duration::from_millis(150), 200, ANTHROPIC_OK.to_string())
        )
        .reply(GROQ_HOST, 200, GROQ_OK)
    );
    let gateway = gateway(transport);

    let response = gateway
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["anthropic", "groq"]
      })))
      .await
      .unwrap();
    let text = response.text().unwrap();
    let claude = text.find("Hello from Claude").unwrap();
    let llama = text.find("Hello from Llama").unwrap();
    assert!(claude < llama);
}

#[tokio::test]
async fn test_calls_run_concurrently()
{   let delay = Duration::from_millis(300);
    let transport = Arc::new(
      ScriptedTransport::new()
        .on(ANTHROPIC_HOST, Script::Delayed(delay, 200, ANTHROPIC_OK.to_string()))
        .on(GOOGLE_HOST, Script::Delayed(delay, 200, GOOGLE_OK.to_string()))
        .on(GROQ_HOST, Script::Delayed(delay, 200, GROQ_OK.to_string()))
    );
    let started = std::time::Instant::now();
    gateway(transport)
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["all"]
      })))
      .await
      .unwrap();
    assert!(started.elapsed() < delay * 3);
}

#[tokio::test]
async fn test_slow_provider_times_out_without_stalling_others()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .on(GOOGLE_HOST, Script::Hang)
        .reply(GROQ_HOST, 200, GROQ_OK)
    );
    let mut config = GatewayConfig::default();
    config.timeout_secs = 1;
    let response = gateway_with(config, transport, all_credentials())
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["gemini", "groq"]
      })))
      .await
      .unwrap();
    let text = response.text().unwrap();
    assert!(text.contains("[Google response unavailable]"));
    assert!(text.contains("Hello from Llama"));
}

#[tokio::test]
async fn test_missing_credential_is_contained_to_its_provider()
{   let transport = Arc::new(ScriptedTransport::new().reply(GROQ_HOST, 200, GROQ_OK));
    let credentials = Credentials::new().with(ProviderId::GROQ, "gsk-test");
    let gateway = gateway_with(GatewayConfig::default(), transport.clone(), credentials);

    let response = gateway
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "providers": ["anthropic", "groq"]
      })))
      .await
      .unwrap();
    assert!(response.text().unwrap().contains("[Anthropic response unavailable]"));
    assert_eq!(transport.seen().len(), 1);

    let err = gateway
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "ai": "claude"
      })))
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProviderNotConfigured);
}

#[tokio::test]
async fn test_synthesis_policy_can_be_chosen_per_request()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .reply(ANTHROPIC_HOST, 200, ANTHROPIC_OK)
        .reply(GROQ_HOST, 200, GROQ_OK)
    );
    let response = gateway(transport)
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {"synthesis": "points"},
        "providers": ["anthropic", "groq"]
      })))
      .await
      .unwrap();
    let expected = format!("{}\n- Hello from Claude\n- Hello from Llama", POINTS_PREAMBLE);
    assert_eq!(response.text().unwrap(), expected);
}

#[tokio::test]
async fn test_ping_is_answered_without_upstream_calls()
{   let transport = Arc::new(ScriptedTransport::new());
    let response = gateway(transport.clone())
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "ping"}],
        "options": {}
      })))
      .await
      .unwrap();
    assert_eq!(response.text(), Some("pong"));
    assert!(transport.seen().is_empty());
}

#[derive(Default)]
struct RecordingObserver
{   urls: Mutex<Vec<String>>
  , outcomes: Mutex<Vec<ProviderOutcome>>
}

impl InvocationObserver for RecordingObserver
{   fn on_dispatch(&self, _provider: &ProviderId, redacted_url: &str, _body_bytes: usize)
    {   self.urls.lock().unwrap().push(redacted_url.to_string());
    }

    fn on_outcome(&self, outcome: &ProviderOutcome, _elapsed: Duration)
    {   self.outcomes.lock().unwrap().push(outcome.clone());
    }
}

#[tokio::test]
async fn test_observer_never_sees_credentials()
{   let transport = Arc::new(ScriptedTransport::new().reply(GOOGLE_HOST, 200, GOOGLE_OK));
    let observer = Arc::new(RecordingObserver::default());
    let gateway = gateway(transport).with_observer(observer.clone());

    gateway
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "hi"}],
        "options": {},
        "ai": "google"
      })))
      .await
      .unwrap();

    let urls = observer.urls.lock().unwrap();
    assert_eq!(urls.len(), 1);
    assert!(!urls[0].contains("goog-test"));
    assert_eq!(observer.outcomes.lock().unwrap().len(), 1);
}

// ===== Configuration =====

#[tokio::test]
async fn test_connection_failure_keeps_key_out_of_error()
{   let mut config = GatewayConfig::default();
    config.providers = vec![ProviderConfig
    {   api_base: Some("http://127.0.0.1:1/v1beta".to_string())
      , ..ProviderConfig::google()
    }];
    config.default_providers = vec![ProviderId::GOOGLE];
    config.timeout_secs = 5;
    let registry = ProviderRegistry::from_config(&config);
    let gateway = Gateway::with_parts(
      config,
      registry,
      Arc::new(HttpTransport::new()),
      Credentials::new().with(ProviderId::GOOGLE, "TOPSECRETKEY123")
    );

    let err = gateway
      .complete(raw(json!({"messages": [{"role": "user", "content": "hi"}], "options": {}})))
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamError);
    assert!(err.message.starts_with("Google"), "message was {}", err.message);
    assert!(!err.message.contains("TOPSECRETKEY123"));
    assert!(!err.raw_detail.contains("TOPSECRETKEY123"));

    let body = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
    assert!(!body.contains("TOPSECRETKEY123"), "body was {}", body);
}

#[tokio::test]
async fn test_probe_skips_providers_without_credentials()
{   let transport = Arc::new(ScriptedTransport::new().reply(GROQ_HOST, 200, GROQ_OK));
    let gateway = gateway_with(
      GatewayConfig::default(),
      transport.clone(),
      Credentials::new().with(ProviderId::GROQ, "gsk-test")
    );

    let reports = gateway.probe().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].provider, ProviderId::GROQ);
    assert_eq!(reports[0].status, "ok");
    assert_eq!(transport.seen().len(), 1);
}

#[test]
fn test_config_from_json_file_fills_defaults()
{   let path = std::env::temp_dir().join(format!("chorus-config-{}.json", std::process::id()));
    std::fs::write(
      &path,
      r#"{"synthesis": "longest", "timeout_secs": 5, "default_providers": ["groq"]}"#
    ).unwrap();

    let config = GatewayConfig::from_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.synthesis, chorus::SynthesisPolicy::Longest);
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.default_providers, vec![ProviderId::GROQ]);
    assert_eq!(config.defaults.max_tokens, 1024);
    assert_eq!(config.providers.len(), 3);
}

#[test]
fn test_config_rejects_zero_timeout()
{   let mut config = GatewayConfig::default();
    config.timeout_secs = 0;
    assert_err!(config.validate());
    assert_ok!(GatewayConfig::default().validate());
}

#[test]
fn test_credentials_debug_hides_secrets()
{   let printed = format!("{:?}", all_credentials());
    assert!(printed.contains("anthropic"));
    assert!(!printed.contains("sk-ant-test"));
}

// ===== Backend actor =====

#[tokio::test]
async fn test_backend_initialization()
{   let backend = GatewayBackend::new(gateway(Arc::new(ScriptedTransport::new())));
    assert_eq!(backend.provider_status().len(), 3);
    assert_ok!(backend.shutdown().await);
}

#[tokio::test]
async fn test_backend_complete_and_probe()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .reply(ANTHROPIC_HOST, 200, ANTHROPIC_OK)
        .reply(GOOGLE_HOST, 401, r#"{"error":{"message":"API key not valid"}}"#)
    );
    let credentials = Credentials::new()
      .with(ProviderId::ANTHROPIC, "sk-ant-test")
      .with(ProviderId::GOOGLE, "goog-test");
    let backend = GatewayBackend::new(
      gateway_with(GatewayConfig::default(), transport, credentials)
    );

    let mut rx = backend
      .complete(raw(json!({
        "messages": [{"role": "user", "content": "What is 2+2?"}],
        "options": {}
      })))
      .await
      .unwrap();
    let response = tokio::time::timeout(Duration::from_secs(5), rx.recv())
      .await
      .unwrap()
      .unwrap()
      .unwrap();
    assert_eq!(response.text(), Some("Hello from Claude"));

    let mut rx = backend.probe().await.unwrap();
    let reports = rx.recv().await.unwrap();
    let status: Vec<(&str, &str)> = reports
      .iter()
      .map(|r| (r.provider.as_str(), r.status.as_str()))
      .collect();
    assert_eq!(status, vec![("anthropic", "ok"), ("google", "error")]);

    let _ = backend.shutdown().await;
}
