use std::future::Future;

use log::{debug, warn};

use crate::error::SummarizeError;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes YouTube transcripts.";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 60_000;
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Condenses transcript text into a short natural-language summary
pub trait Summarizer: Send + Sync {
    fn summarize(&self, transcript_text: &str) -> impl Future<Output = Result<String, SummarizeError>> + Send;
}

/// API keys read once at startup
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

/// Chat-completion backed summarizer; `claude*` models go to Anthropic, everything else to OpenAI
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    credentials: Credentials,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_input_chars: usize,
    openai_base_url: String,
    anthropic_base_url: String,
}

impl LlmSummarizer {
    pub fn new(client: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            anthropic_base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.anthropic_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn summarize_anthropic(&self, transcript_text: &str) -> Result<String, SummarizeError> {
        let api_key = self
            .credentials
            .anthropic_api_key
            .as_deref()
            .ok_or(SummarizeError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        debug!("Summarizing via Anthropic API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": user_message(transcript_text)
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.anthropic_base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                provider: "Anthropic",
                status,
                body,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }

    async fn summarize_openai(&self, transcript_text: &str) -> Result<String, SummarizeError> {
        let api_key = self
            .credentials
            .openai_api_key
            .as_deref()
            .ok_or(SummarizeError::MissingApiKey("OPENAI_API_KEY"))?;

        debug!("Summarizing via OpenAI API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_message(transcript_text)
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.openai_base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                provider: "OpenAI",
                status,
                body,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript_text: &str) -> Result<String, SummarizeError> {
        let text = truncate_input(transcript_text, self.max_input_chars);
        if text.len() < transcript_text.len() {
            warn!(
                "Transcript truncated from {} to {} chars before summarization (limit {})",
                transcript_text.chars().count(),
                text.chars().count(),
                self.max_input_chars
            );
        }

        let summary = if is_anthropic_model(&self.model) {
            self.summarize_anthropic(text).await?
        } else {
            self.summarize_openai(text).await?
        };
        Ok(summary.trim().to_string())
    }
}

fn user_message(transcript_text: &str) -> String {
    format!("Summarize the following transcript:\n\n{transcript_text}")
}

fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

/// Cut `text` to at most `max_chars` characters, backing off to the last whitespace
/// so words are not split. Falls back to a hard cut when there is no whitespace.
pub fn truncate_input(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let head = &text[..cut];
    match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => head[..idx].trim_end(),
        _ => head,
    }
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String, SummarizeError> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Err(SummarizeError::UnexpectedResponse("Anthropic"))
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String, SummarizeError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|text| text.to_string())
        .ok_or(SummarizeError::UnexpectedResponse("OpenAI"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_is_anthropic_model() {
        assert!(is_anthropic_model("claude-sonnet-4-6"));
        assert!(is_anthropic_model("claude-3-opus-20240229"));
        assert!(!is_anthropic_model("gpt-3.5-turbo"));
        assert!(!is_anthropic_model("gpt-4o-mini"));
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [
                {
                    "type": "text",
                    "text": "Here is the summary."
                }
            ]
        });
        assert_eq!(extract_anthropic_text(&json).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_anthropic_text_empty() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_text(&json).is_err());
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "Summary of the video."
                    }
                }
            ]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "Summary of the video.");
    }

    #[test]
    fn test_extract_openai_text_empty() {
        let json = serde_json::json!({"choices": []});
        assert!(matches!(
            extract_openai_text(&json),
            Err(SummarizeError::UnexpectedResponse("OpenAI"))
        ));
    }

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate_input("hello world", 100), "hello world");
        assert_eq!(truncate_input("hello", 5), "hello");
        assert_eq!(truncate_input("", 0), "");
    }

    #[test]
    fn test_truncate_backs_off_to_whitespace() {
        assert_eq!(truncate_input("hello wonderful world", 12), "hello");
        assert_eq!(truncate_input("one two three", 8), "one two");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "ééééééééé";
        let cut = truncate_input(text, 4);
        assert_eq!(cut, "éééé");
        assert_eq!(cut.chars().count(), 4);
    }

    #[tokio::test]
    async fn test_missing_key_surfaces_at_request_time() {
        let summarizer = LlmSummarizer::new(reqwest::Client::new(), Credentials::default());
        let err = summarizer.summarize("hello").await.unwrap_err();
        assert!(matches!(err, SummarizeError::MissingApiKey("OPENAI_API_KEY")));

        let summarizer = summarizer.with_model("claude-sonnet-4-6");
        let err = summarizer.summarize("hello").await.unwrap_err();
        assert!(matches!(err, SummarizeError::MissingApiKey("ANTHROPIC_API_KEY")));
    }

    type Captured = Arc<Mutex<Vec<(HeaderMap, serde_json::Value)>>>;

    async fn spawn_llm(path: &'static str, reply: serde_json::Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let seen = captured.clone();

        let app = Router::new().route(
            path,
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let seen = seen.clone();
                let reply = reply.clone();
                async move {
                    seen.lock().unwrap().push((headers, body));
                    Json(reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (base, captured)
    }

    #[tokio::test]
    async fn test_openai_request_shape() {
        let reply = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "  A short summary.\n"}}]
        });
        let (base, captured) = spawn_llm("/chat/completions", reply).await;

        let credentials = Credentials {
            openai_api_key: Some("sk-test".to_string()),
            anthropic_api_key: None,
        };
        let summarizer = LlmSummarizer::new(reqwest::Client::new(), credentials).with_openai_base_url(&base);

        let summary = summarizer.summarize("hello").await.unwrap();
        assert_eq!(summary, "A short summary.");

        let captured = captured.lock().unwrap();
        let (headers, body) = &captured[0];
        assert_eq!(headers.get("authorization").unwrap(), "Bearer sk-test");
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(
            body["messages"][1]["content"],
            "Summarize the following transcript:\n\nhello"
        );
    }

    #[tokio::test]
    async fn test_anthropic_request_shape() {
        let reply = serde_json::json!({"content": [{"type": "text", "text": "Claude summary"}]});
        let (base, captured) = spawn_llm("/messages", reply).await;

        let credentials = Credentials {
            openai_api_key: None,
            anthropic_api_key: Some("ant-test".to_string()),
        };
        let summarizer = LlmSummarizer::new(reqwest::Client::new(), credentials)
            .with_model("claude-sonnet-4-6")
            .with_max_tokens(512)
            .with_anthropic_base_url(&base);

        assert_eq!(summarizer.summarize("hello").await.unwrap(), "Claude summary");

        let captured = captured.lock().unwrap();
        let (headers, body) = &captured[0];
        assert_eq!(headers.get("x-api-key").unwrap(), "ant-test");
        assert_eq!(headers.get("anthropic-version").unwrap(), "2023-06-01");
        assert_eq!(body["system"], SYSTEM_PROMPT);
        assert_eq!(body["max_tokens"], 512);
    }

    #[tokio::test]
    async fn test_input_is_truncated_before_sending() {
        let reply = serde_json::json!({"choices": [{"message": {"content": "ok"}}]});
        let (base, captured) = spawn_llm("/chat/completions", reply).await;

        let credentials = Credentials {
            openai_api_key: Some("sk-test".to_string()),
            anthropic_api_key: None,
        };
        let summarizer = LlmSummarizer::new(reqwest::Client::new(), credentials)
            .with_openai_base_url(&base)
            .with_max_input_chars(9);

        summarizer.summarize("one two three four").await.unwrap();

        let captured = captured.lock().unwrap();
        assert_eq!(
            captured[0].1["messages"][1]["content"],
            "Summarize the following transcript:\n\none two"
        );
    }
}
