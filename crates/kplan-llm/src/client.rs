//! The completion-service boundary.
//!
//! [`CompletionClient`] is the trait the rest of the crate is written
//! against; [`OpenAiClient`] implements it over an OpenAI-compatible
//! chat-completions endpoint.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Request ─────────────────────────────────────────────────────────────────

/// One prompt for the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub system:     String,
  pub user:       String,
  /// Ask the service to reply with a JSON document.
  pub structured: bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Sends a prompt to a text-completion service and returns its raw reply.
///
/// Implementations perform no retries. Transport, authentication and
/// service-side failures, and an empty reply, are all errors.
pub trait CompletionClient: Send + Sync {
  fn complete<'a>(
    &'a self,
    request: &'a CompletionRequest,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for [`OpenAiClient`], deserialised from the
/// `[completion]` table of the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
  pub api_key:      String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_model")]
  pub model:        String,
  /// Whole-request timeout. A hung call holds a queue worker until this
  /// fires.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }

fn default_model() -> String { "gpt-4o-mini".to_string() }

fn default_timeout_secs() -> u64 { 60 }

impl CompletionConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_base_url(),
      model:        default_model(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:           &'a str,
  messages:        [ChatMessage<'a>; 2],
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible chat-completions API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenAiClient {
  client: Client,
  config: CompletionConfig,
}

impl OpenAiClient {
  pub fn new(config: CompletionConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/chat/completions",
      self.config.base_url.trim_end_matches('/')
    )
  }
}

impl CompletionClient for OpenAiClient {
  async fn complete(&self, request: &CompletionRequest) -> Result<String> {
    let body = ChatRequest {
      model:           &self.config.model,
      messages:        [
        ChatMessage {
          role:    "system",
          content: &request.system,
        },
        ChatMessage {
          role:    "user",
          content: &request.user,
        },
      ],
      response_format: request
        .structured
        .then_some(ResponseFormat { kind: "json_object" }),
    };

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ChatResponse = resp.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or(Error::EmptyResponse)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
  use serde_json::{Value, json};

  use super::*;

  /// Serve `router` on an ephemeral local port and return its base URL.
  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address  = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{address}/v1")
  }

  fn client(base_url: String) -> OpenAiClient {
    OpenAiClient::new(CompletionConfig {
      base_url,
      timeout_secs: 1,
      ..CompletionConfig::new("sk-test")
    })
    .unwrap()
  }

  fn request(structured: bool) -> CompletionRequest {
    CompletionRequest {
      system: "be brief".into(),
      user: "hello world".into(),
      structured,
    }
  }

  fn reply(content: Value) -> Json<Value> {
    Json(json!({
      "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
  }

  #[tokio::test]
  async fn structured_request_sends_json_format_and_credential() {
    let seen: Arc<Mutex<Option<(Value, String)>>> = Arc::default();
    let sink = seen.clone();
    let router = Router::new().route(
      "/v1/chat/completions",
      post(move |headers: HeaderMap, Json(body): Json<Value>| {
        let sink = sink.clone();
        async move {
          let auth = headers["authorization"].to_str().unwrap().to_string();
          *sink.lock().unwrap() = Some((body, auth));
          reply(json!("{\"ok\":true}"))
        }
      }),
    );
    let base = serve(router).await;

    let text = client(base).complete(&request(true)).await.unwrap();
    assert_eq!(text, "{\"ok\":true}");

    let (body, auth) = seen.lock().unwrap().take().unwrap();
    assert_eq!(auth, "Bearer sk-test");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hello world");
  }

  #[tokio::test]
  async fn freeform_request_omits_response_format() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let sink = seen.clone();
    let router = Router::new().route(
      "/v1/chat/completions",
      post(move |Json(body): Json<Value>| {
        let sink = sink.clone();
        async move {
          *sink.lock().unwrap() = Some(body);
          reply(json!("plain text"))
        }
      }),
    );
    let base = serve(router).await;

    client(base).complete(&request(false)).await.unwrap();
    let body = seen.lock().unwrap().take().unwrap();
    assert!(body.get("response_format").is_none(), "{body}");
  }

  #[tokio::test]
  async fn server_error_is_reported_with_status() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = serve(router).await;

    let err = client(base).complete(&request(true)).await.unwrap_err();
    assert!(
      matches!(err, Error::Status { status: 502, ref body } if body == "upstream down"),
      "{err}"
    );
    assert!(err.is_external_service());
  }

  #[tokio::test]
  async fn null_content_is_an_empty_response() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|| async { reply(Value::Null) }),
    );
    let base = serve(router).await;

    let err = client(base).complete(&request(true)).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse), "{err}");
  }

  #[tokio::test]
  async fn slow_service_hits_the_client_timeout() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        reply(json!("too late"))
      }),
    );
    let base = serve(router).await;

    let err = client(base).complete(&request(true)).await.unwrap_err();
    assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()), "{err}");
  }
}
