use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;

use crate::Summarizer;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const OPENAI_BASE: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE: &str = "https://api.anthropic.com/v1";

/// Which API a model is served from, with its key
#[derive(Debug, Clone)]
pub enum Backend {
    OpenAi { api_key: String },
    Anthropic { api_key: String },
}

/// Summarizer backed by a hosted LLM
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    backend: Backend,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl LlmSummarizer {
    pub fn new(client: reqwest::Client, backend: Backend, model: impl Into<String>, max_tokens: u32) -> Self {
        let base_url = match &backend {
            Backend::OpenAi { .. } => OPENAI_BASE,
            Backend::Anthropic { .. } => ANTHROPIC_BASE,
        };
        Self {
            client,
            backend,
            model: model.into(),
            max_tokens,
            base_url: base_url.to_string(),
        }
    }

    /// Send requests to another API root, e.g. an OpenAI-compatible gateway
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn summarize_anthropic(&self, api_key: &str, text: &str) -> Result<String> {
        debug!("Summarizing {} chars via Anthropic API with model {}", text.len(), self.model);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": user_message(text)
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Anthropic API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }

    async fn summarize_openai(&self, api_key: &str, text: &str) -> Result<String> {
        debug!("Summarizing {} chars via OpenAI API with model {}", text.len(), self.model);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_message(text)
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize_text(&self, text: &str) -> Result<String> {
        let summary = match &self.backend {
            Backend::Anthropic { api_key } => self.summarize_anthropic(api_key, text).await?,
            Backend::OpenAi { api_key } => self.summarize_openai(api_key, text).await?,
        };
        Ok(summary.trim().to_string())
    }
}

pub fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

fn user_message(text: &str) -> String {
    format!("Summarize the following text:\n\n{text}")
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
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
    bail!("unexpected Anthropic API response format");
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected OpenAI API response format");
}

/// Split `text` into consecutive chunks of at most `chunk_size` characters.
///
/// Counts `char`s, so a chunk never splits a code point. A zero size is
/// treated as one.
pub fn split_text_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

/// Summarize the first `depth` chunks of `text` and join the results with spaces.
///
/// Chunks past `depth` are never sent to the summarizer.
pub async fn summarize_large_text(
    summarizer: &dyn Summarizer,
    text: &str,
    chunk_size: usize,
    depth: usize,
) -> Result<String> {
    let chunks = split_text_into_chunks(text, chunk_size);
    if chunks.len() > depth {
        debug!("Truncating {} chunks to depth {depth}", chunks.len());
    }

    let mut summaries = Vec::with_capacity(depth.min(chunks.len()));
    for chunk in chunks.iter().take(depth) {
        summaries.push(summarizer.summarize_text(chunk).await?);
    }

    Ok(summaries.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSummarizer;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_is_anthropic_model() {
        assert!(is_anthropic_model("claude-sonnet-4-6"));
        assert!(is_anthropic_model("claude-3-opus-20240229"));
        assert!(!is_anthropic_model("gpt-3.5-turbo"));
        assert!(!is_anthropic_model("gpt-4o-mini"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(user_message("abc"), "Summarize the following text:\n\nabc");
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
        assert!(extract_openai_text(&json).is_err());
    }

    #[test]
    fn test_split_is_lossless_and_sized() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split_text_into_chunks(text, 5);
        assert_eq!(chunks.len(), 6); // ceil(26 / 5)
        assert!(chunks[..5].iter().all(|c| c.chars().count() == 5));
        assert_eq!(chunks[5], "z");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_exact_multiple() {
        let chunks = split_text_into_chunks("abcdef", 3);
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_text_into_chunks("", 500).is_empty());
    }

    #[test]
    fn test_split_multibyte() {
        let text = "héllo wörld ✓✓";
        let chunks = split_text_into_chunks(text, 4);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], "héll");
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn test_summarize_large_text_truncates_to_depth() {
        let summarizer = MockSummarizer::new();
        let text = "aaaabbbbccccdddd";

        let summary = summarize_large_text(&summarizer, text, 4, 2).await.unwrap();

        assert_eq!(summary, "summary(aaaa) summary(bbbb)");
        assert_eq!(summarizer.requests(), vec!["aaaa", "bbbb"]);
    }

    #[tokio::test]
    async fn test_summarize_large_text_depth_zero() {
        let summarizer = MockSummarizer::new();
        let summary = summarize_large_text(&summarizer, "some text", 4, 0).await.unwrap();
        assert_eq!(summary, "");
        assert!(summarizer.requests().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_large_text_fewer_chunks_than_depth() {
        let summarizer = MockSummarizer::new();
        let summary = summarize_large_text(&summarizer, "abc", 500, 3).await.unwrap();
        assert_eq!(summary, "summary(abc)");
        assert_eq!(summarizer.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_large_text_propagates_errors() {
        let summarizer = MockSummarizer::new();
        summarizer.fail_with("rate limited");
        assert!(summarize_large_text(&summarizer, "abcdef", 2, 3).await.is_err());
    }

    fn openai(server: &mockito::Server) -> LlmSummarizer {
        let backend = Backend::OpenAi {
            api_key: "sk-test".to_string(),
        };
        LlmSummarizer::new(reqwest::Client::new(), backend, "gpt-3.5-turbo", 1500).with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_openai_request_and_trimmed_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 1500,
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "Summarize the following text:\n\nsome transcript"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "  A short summary.\n"}}]}).to_string())
            .create_async()
            .await;

        let summary = openai(&server).summarize_text("some transcript").await.unwrap();

        assert_eq!(summary, "A short summary.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = openai(&server).summarize_text("text").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_anthropic_request_and_trimmed_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "ak-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::Json(json!({
                "model": "claude-sonnet-4-6",
                "max_tokens": 800,
                "system": "You are a helpful assistant.",
                "messages": [
                    {"role": "user", "content": "Summarize the following text:\n\nsome description"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"content": [{"type": "text", "text": "\n Described. "}]}).to_string())
            .create_async()
            .await;

        let backend = Backend::Anthropic {
            api_key: "ak-test".to_string(),
        };
        let summarizer = LlmSummarizer::new(reqwest::Client::new(), backend, "claude-sonnet-4-6", 800)
            .with_base_url(format!("{}/", server.url()));

        let summary = summarizer.summarize_text("some description").await.unwrap();

        assert_eq!(summary, "Described.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unexpected_reply_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        assert!(openai(&server).summarize_text("text").await.is_err());
    }
}
