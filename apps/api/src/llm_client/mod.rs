//! LLM client: the single point of entry for all model API calls in Pourtrait.
//!
//! ARCHITECTURAL RULE: No other module may call the model provider directly.
//! Taste-profile mapping, wine-list OCR and any future model use go through here.
//!
//! Every call runs in JSON mode; callers parse replies with `parse_json_reply`
//! into their own schema types and validate ranges themselves.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2000;
/// One initial attempt plus a single delayed retry on 429/5xx.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(1500);

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
}

impl LlmError {
    /// Maps a client failure onto the API error surface. Rate limiting keeps
    /// its 429; everything else becomes a generic model error tagged `code`.
    pub fn into_app_error(self, code: &'static str) -> crate::errors::AppError {
        match self {
            LlmError::RateLimited { .. } | LlmError::Api { status: 429, .. } => {
                crate::errors::AppError::RateLimited(self.to_string())
            }
            other => crate::errors::AppError::llm(code, other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: MessageContent::Text(text.into()),
        }
    }

    /// User turn carrying an image as a `data:` URL alongside instructions.
    pub fn user_with_image(text: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
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

impl LlmResponse {
    pub fn is_truncated(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length")
    }

    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by all services in Pourtrait.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    completions_url: String,
}

impl LlmClient {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            api_key,
            model,
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw chat-completions call in JSON mode.
    /// A 429 or 5xx is retried once after a fixed delay.
    pub async fn call(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    RETRY_DELAY.as_millis()
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .post(&self.completions_url)
                .bearer_auth(&self.api_key)
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

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("LLM API rate limited the request");
                last_error = Some(LlmError::RateLimited { retries: attempt });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;
            if llm_response.is_truncated() {
                warn!("LLM reply hit the {MAX_TOKENS}-token limit and was cut off");
            }

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS - 1,
        }))
    }
}

/// Parses a model reply as JSON, tolerating markdown fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_image_message_serializes_as_parts() {
        let msg = ChatMessage::user_with_image("read this list", "data:image/png;base64,AAAA");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "image_url");
        assert_eq!(
            value["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_text_message_serializes_as_string() {
        let value = serde_json::to_value(ChatMessage::system("be terse")).unwrap();
        assert_eq!(value["content"], "be terse");
    }

    #[test]
    fn test_length_finish_reason_marks_truncation() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"{\"a\":"},"finish_reason":"length"}],"usage":null}"#,
        )
        .unwrap();
        assert!(response.is_truncated());
    }

    #[test]
    fn test_response_text_skips_blank_content() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  "},"finish_reason":"stop"}],"usage":null}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
    }

    // ─── HTTP behaviour against a mock server ───

    use httpmock::prelude::*;
    use serde_json::json;

    pub(crate) fn reply_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"content": content}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        })
    }

    pub(crate) fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("sk-test".into(), "gpt-4o-mini".into(), &server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn test_call_posts_json_mode_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_includes(r#""model":"gpt-4o-mini""#)
                .body_includes(r#""response_format":{"type":"json_object"}"#);
            then.status(200).json_body(reply_body(r#"{"ok":true}"#));
        });

        let response = client_for(&server)
            .call(&[ChatMessage::user("hi")], 0.2)
            .await
            .unwrap();
        assert_eq!(response.text(), Some(r#"{"ok":true}"#));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_retried_once_then_surfaces() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).json_body(json!({"error": {"message": "slow down"}}));
        });

        let err = client_for(&server)
            .call(&[ChatMessage::user("hi")], 0.2)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retries: 1 }));
        assert_eq!(mock.calls(), 2);
        assert!(matches!(
            err.into_app_error("MAPPING_UPSTREAM_FAILED"),
            crate::errors::AppError::RateLimited(_)
        ));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(400).json_body(json!({"error": {"message": "bad model"}}));
        });

        let err = client_for(&server)
            .call(&[ChatMessage::user("hi")], 0.2)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 400, ref message } if message == "bad model"));
        assert_eq!(mock.calls(), 1);
    }
}
