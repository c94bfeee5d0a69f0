//! LLM (`OpenAI`) API client module
//!
//! Encapsulates the chat completion call used to turn a prompt into a digest.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::errors::DigestError;

/// Returned in place of an empty or absent model response.
pub const NO_SUMMARY_PLACEHOLDER: &str = "[No summary]";

/// Low randomness keeps digests stable across regenerations.
pub const TEMPERATURE: f64 = 0.2;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Prompt in, text out.
#[async_trait]
pub trait Complete: Send + Sync {
    /// # Errors
    ///
    /// Returns `CompletionFailure` (or `AuthFailure` for rejected credentials)
    /// when the model call does not produce a response.
    async fn complete(&self, prompt: &str) -> Result<String, DigestError>;
}

/// LLM API client for generating summaries
pub struct LlmClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns `CompletionFailure` if the HTTP client cannot be constructed.
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        model_name: String,
        base_url: String,
    ) -> Result<Self, DigestError> {
        let http = Client::builder().build().map_err(|e| {
            DigestError::CompletionFailure(format!("Failed to build OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            api_key,
            org_id,
            model_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// # Errors
    ///
    /// See [`LlmClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, DigestError> {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_org_id.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        )
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// A single user-role message holding the whole prompt.
    #[must_use]
    pub fn build_messages(prompt: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(prompt.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    fn request_body(&self, messages: &[ChatCompletionMessage]) -> Value {
        json!({
            "model": self.model_name,
            "temperature": TEMPERATURE,
            "messages": build_chat_input_from_prompt(messages),
        })
    }

    async fn send(&self, body: &Value) -> Result<Value, DigestError> {
        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body);

        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DigestError::CompletionFailure(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(DigestError::AuthFailure(format!(
                    "OpenAI rejected the API key (status {status}): {error_text}"
                )));
            }
            return Err(DigestError::CompletionFailure(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DigestError::CompletionFailure(format!("Failed to parse OpenAI response: {e}")))
    }
}

#[async_trait]
impl Complete for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, DigestError> {
        #[cfg(feature = "debug-logs")]
        info!("Using ChatGPT prompt:\n{}", prompt);

        info!(
            "Requesting completion from {} (~{} input tokens)",
            self.model_name,
            estimate_tokens(prompt)
        );

        let messages = Self::build_messages(prompt);
        let body = self.request_body(&messages);
        let response_json = self.send(&body).await?;

        let text = extract_completion_text(&response_json);
        debug!("Completion returned {} characters", text.len());
        Ok(text)
    }
}

/// Converts chat messages into the JSON array the chat completions endpoint expects.
pub(crate) fn build_chat_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|msg| {
            let role_str = match msg.role {
                MessageRole::system => "system",
                MessageRole::user => "user",
                MessageRole::assistant => "assistant",
                MessageRole::function => "function",
                MessageRole::tool => "tool",
            };

            match &msg.content {
                Content::Text(text) => Some(json!({
                    "role": role_str,
                    "content": text,
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// Pulls `choices[0].message.content`, trimmed. Empty or absent content becomes
/// [`NO_SUMMARY_PLACEHOLDER`].
#[must_use]
pub fn extract_completion_text(response_json: &Value) -> String {
    response_json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(|| NO_SUMMARY_PLACEHOLDER.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_single_user_message_and_fixed_temperature() {
        let client = LlmClient::new(
            "key".to_string(),
            None,
            "gpt-4.1".to_string(),
            "http://localhost/v1/".to_string(),
        )
        .unwrap();

        let body = client.request_body(&LlmClient::build_messages("hello"));
        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(client.base_url, "http://localhost/v1");
    }

    #[test]
    fn extract_trims_and_falls_back_to_placeholder() {
        let ok = json!({"choices": [{"message": {"content": "  - point\n"}}]});
        assert_eq!(extract_completion_text(&ok), "- point");

        let empty = json!({"choices": [{"message": {"content": ""}}]});
        assert_eq!(extract_completion_text(&empty), NO_SUMMARY_PLACEHOLDER);

        let null_content = json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(extract_completion_text(&null_content), NO_SUMMARY_PLACEHOLDER);

        assert_eq!(extract_completion_text(&json!({"choices": []})), NO_SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn estimate_tokens_counts_chars() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("hello"), 2);
    }
}
