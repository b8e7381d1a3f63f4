/// Generation Client — the single point of entry for all generative-AI calls.
///
/// ARCHITECTURAL RULE: No pipeline stage talks to the Gemini API directly.
/// Stages depend on the `GenerationClient` trait; `GeminiClient` is the
/// production implementation, configured once per process with one credential.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod mock;
pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const MAX_OUTPUT_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Unexpected structured output: {0}")]
    UnexpectedShape(String),
}

/// Output contract requested from the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    FreeText,
    /// Caller expects a JSON object, or a single-element array wrapping one.
    StructuredJson,
}

/// Abstraction over the remote text/structured-generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, prompt: &str, mode: GenerationMode) -> Result<String, LlmError>;

    /// Structured completion, parsed down to a single JSON object.
    async fn complete_json(&self, prompt: &str) -> Result<Value, LlmError> {
        let text = self.complete(prompt, GenerationMode::StructuredJson).await?;
        parse_structured(&text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiClient
// ────────────────────────────────────────────────────────────────────────────

/// Production generation client over the Gemini `generateContent` API.
/// Retries rate limits, 5xx responses and transport errors with exponential backoff.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    retry_base_delay: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

fn build_request(prompt: &str, mode: GenerationMode) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: match mode {
                GenerationMode::StructuredJson => Some("application/json"),
                GenerationMode::FreeText => None,
            },
        },
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn complete(&self, prompt: &str, mode: GenerationMode) -> Result<String, LlmError> {
        let request_body = build_request(prompt, mode);
        let url = self.endpoint();

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay, attempt);
                warn!(
                    "Generation call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(if status.as_u16() == 429 {
                    LlmError::RateLimited {
                        retries: MAX_RETRIES,
                    }
                } else {
                    LlmError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Generation call succeeded ({:?}): prompt_tokens={}, output_tokens={}",
                    mode, usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return parsed.text().ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Exponential backoff before retry `attempt` (1-based): base, 2×base, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (1 << attempt.saturating_sub(1))
}

// ────────────────────────────────────────────────────────────────────────────
// Structured output helpers
// ────────────────────────────────────────────────────────────────────────────

/// Parses structured model output into a single JSON object.
/// A JSON array is accepted when non-empty; its first element is the result.
pub fn parse_structured(text: &str) -> Result<Value, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    let value: Value = serde_json::from_str(text)?;
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };

    match value {
        Value::Object(_) => Ok(value),
        Value::Array(_) => Err(LlmError::UnexpectedShape("empty JSON array".to_string())),
        other => Err(LlmError::UnexpectedShape(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_structured_takes_first_array_element() {
        let value = parse_structured(r#"[{"name": "Jane"}, {"name": "Other"}]"#).unwrap();
        assert_eq!(value["name"], "Jane");
    }

    #[test]
    fn test_parse_structured_rejects_non_objects() {
        assert!(matches!(
            parse_structured("42"),
            Err(LlmError::UnexpectedShape(_))
        ));
        assert!(matches!(
            parse_structured("[]"),
            Err(LlmError::UnexpectedShape(_))
        ));
        assert!(matches!(parse_structured("   "), Err(LlmError::EmptyContent)));
        assert!(matches!(
            parse_structured("Sorry, I cannot help"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_structured_request_sets_json_mime_type() {
        let body = serde_json::to_value(build_request("hi", GenerationMode::StructuredJson)).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");

        let body = serde_json::to_value(build_request("hi", GenerationMode::FreeText)).unwrap();
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_backoff_doubles_from_one_second() {
        assert_eq!(backoff_delay(RETRY_BASE_DELAY, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(RETRY_BASE_DELAY, 2), Duration::from_secs(2));
    }

    mod gemini_http {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use axum::extract::State;
        use axum::http::StatusCode;
        use axum::Router;

        use super::super::*;

        #[derive(Clone)]
        struct ScriptedServer {
            calls: Arc<AtomicUsize>,
            replies: Arc<Vec<(StatusCode, String)>>,
        }

        /// Replies in order; the last reply repeats once the script runs out.
        async fn reply(State(server): State<ScriptedServer>) -> (StatusCode, String) {
            let n = server.calls.fetch_add(1, Ordering::SeqCst);
            server.replies[n.min(server.replies.len() - 1)].clone()
        }

        async fn spawn_server(replies: Vec<(StatusCode, String)>) -> (GeminiClient, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let app = Router::new().fallback(reply).with_state(ScriptedServer {
                calls: calls.clone(),
                replies: Arc::new(replies),
            });
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = GeminiClient::new(
                "test-key".to_string(),
                "gemini-test".to_string(),
                format!("http://{addr}"),
                Duration::from_secs(10),
            )
            .unwrap()
            .with_retry_base_delay(Duration::from_millis(5));
            (client, calls)
        }

        fn ok_body(text: &str) -> String {
            serde_json::json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
        }

        #[tokio::test]
        async fn test_server_error_is_retried_then_succeeds() {
            let (client, calls) = spawn_server(vec![
                (StatusCode::SERVICE_UNAVAILABLE, "overloaded".to_string()),
                (StatusCode::OK, ok_body("hello")),
            ])
            .await;

            let text = client.complete("hi", GenerationMode::FreeText).await.unwrap();
            assert_eq!(text, "hello");
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_client_error_fails_immediately_with_api_message() {
            let (client, calls) = spawn_server(vec![(
                StatusCode::BAD_REQUEST,
                r#"{"error": {"code": 400, "message": "API key not valid"}}"#.to_string(),
            )])
            .await;

            let err = client.complete("hi", GenerationMode::FreeText).await.unwrap_err();
            match err {
                LlmError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "API key not valid");
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_rate_limits_exhaust_retries() {
            let (client, calls) =
                spawn_server(vec![(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string())]).await;

            let err = client.complete("hi", GenerationMode::StructuredJson).await.unwrap_err();
            assert!(matches!(err, LlmError::RateLimited { retries: 3 }));
            assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES as usize);
        }

        #[tokio::test]
        async fn test_complete_json_parses_fenced_object() {
            let (client, _) =
                spawn_server(vec![(StatusCode::OK, ok_body("```json\n{\"name\": \"Jane\"}\n```"))]).await;

            let value = client.complete_json("hi").await.unwrap();
            assert_eq!(value["name"], "Jane");
        }
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }
}
