//! LLM client: the single point of entry for language-model calls.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. No other module
//! may call the provider directly; handlers go through `suggest`.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use crate::config::Config;
use prompts::{build_suggestion_prompt, SUGGESTION_SYSTEM};

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("A4F_API_KEY is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited on all {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completions client with retry on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            api_url,
            model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.llm_api_key.clone(),
            config.llm_api_url.clone(),
            config.llm_model.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw chat-completion call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    /// Transport failures are returned at once.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut last_error = LlmError::RateLimited {
            attempts: MAX_ATTEMPTS,
        };

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("LLM API rate limited the request");
                last_error = LlmError::RateLimited {
                    attempts: MAX_ATTEMPTS,
                };
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                };
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error)
    }

    /// Asks the model for free-text improvement suggestions on a resume.
    pub async fn suggest(&self, resume_text: &str, user_name: &str) -> Result<String, LlmError> {
        let prompt = build_suggestion_prompt(resume_text, user_name);
        let response = self.call(&prompt, SUGGESTION_SYSTEM).await?;
        let text = response.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    pub(crate) fn completion(text: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": text}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5}
        })
    }

    fn client(url: String) -> LlmClient {
        LlmClient::new(Some("test-key".to_string()), url, "test-model".to_string()).unwrap()
    }

    #[test]
    fn test_response_text_takes_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"content": "first"}},
                {"message": {"content": "second"}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let llm = LlmClient::new(None, "http://127.0.0.1:1".to_string(), "m".to_string()).unwrap();
        assert!(matches!(
            llm.suggest("text", "Jane").await,
            Err(LlmError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_suggest_sends_prompt_and_returns_content() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer test-key");
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["max_tokens"], 200);
                assert_eq!(body["messages"][0]["role"], "system");
                let prompt = body["messages"][1]["content"].as_str().unwrap();
                assert!(prompt.starts_with("The following resume belongs to Jane."));
                Json(completion("  Quantify your impact.  "))
            }),
        );
        let llm = client(spawn_mock(router).await);
        let suggestion = llm.suggest("Engineer at Acme", "Jane").await.unwrap();
        assert_eq!(suggestion, "Quantify your impact.");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"error": {"message": "bad key"}})),
                    )
                }
            }),
        );
        let llm = client(spawn_mock(router).await);
        match llm.suggest("text", "Jane").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (StatusCode::OK, Json(completion("Add metrics.")))
                    }
                }
            }),
        );
        let llm = client(spawn_mock(router).await);
        assert_eq!(llm.suggest("text", "Jane").await.unwrap(), "Add metrics.");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_attempts() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::TOO_MANY_REQUESTS, Json(json!({})))
                }
            }),
        );
        let llm = client(spawn_mock(router).await);
        assert!(matches!(
            llm.suggest("text", "Jane").await,
            Err(LlmError::RateLimited { attempts: 3 })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let llm = client(format!("http://{addr}/v1/chat/completions"));
        let started = std::time::Instant::now();
        assert!(matches!(
            llm.suggest("text", "Jane").await,
            Err(LlmError::Http(_))
        ));
        assert!(
            started.elapsed() < std::time::Duration::from_millis(900),
            "a refused connection must not wait out the backoff"
        );
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion("   ")) }),
        );
        let llm = client(spawn_mock(router).await);
        assert!(matches!(
            llm.suggest("text", "Jane").await,
            Err(LlmError::EmptyContent)
        ));
    }
}
