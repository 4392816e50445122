//! LLM provider abstractions for pex-runtime.
//!
//! A provider turns a list of chat messages into a [`CompletionStream`]:
//! a sequence of [`CompletionChunk`]s that ends when the stream returns
//! `None`. Streaming transports deliver many chunks of delta text; batch
//! transports deliver one chunk holding the full message. Callers do not
//! care which, they read [`CompletionChunk::text`].
//!
//! Tokens are wrapped in [`GitHubToken`] as soon as they are read.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod secrets;
mod sse;

#[cfg(feature = "github")]
mod github;

pub use secrets::{GitHubToken, GITHUB_TOKEN_ENV};

#[cfg(feature = "github")]
pub use github::{GitHubModelsProvider, DEFAULT_BASE_URL};

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Response stream failed: {0}")]
    StreamError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use (e.g., "openai/gpt-4o")
    pub model: String,

    /// Ask the transport to stream deltas instead of one full message
    pub stream: bool,

    /// Organization to attribute usage to
    pub org: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: pex_core::DEFAULT_MODEL.to_string(),
            stream: false,
            org: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl CompletionConfig {
    /// Create a config for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_org(mut self, org: Option<String>) -> Self {
        self.org = org.filter(|o| !o.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Content of one choice in a completion chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceContent {
    /// Incremental text from a streaming transport
    Delta(String),

    /// Complete message text from a batch transport
    Message(String),
}

impl ChoiceContent {
    pub fn text(&self) -> &str {
        match self {
            ChoiceContent::Delta(text) | ChoiceContent::Message(text) => text,
        }
    }
}

/// One fragment read from a completion stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionChunk {
    pub choices: Vec<ChoiceContent>,
}

impl CompletionChunk {
    /// A chunk carrying one streamed delta.
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChoiceContent::Delta(text.into())],
        }
    }

    /// A chunk carrying one complete message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChoiceContent::Message(text.into())],
        }
    }

    /// Text of every choice, in order.
    pub fn text(&self) -> String {
        self.choices.iter().map(ChoiceContent::text).collect()
    }
}

/// Chat completion body as sent over the wire, in either transport mode.
#[derive(Debug, Deserialize)]
pub(crate) struct WireChunk {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    #[serde(default)]
    delta: Option<WireContent>,
    #[serde(default)]
    message: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    content: Option<String>,
}

impl From<WireChunk> for CompletionChunk {
    fn from(wire: WireChunk) -> Self {
        let mut choices = Vec::new();
        for choice in wire.choices {
            // Delta before message when a transport fills both
            if let Some(text) = choice.delta.and_then(|d| d.content) {
                choices.push(ChoiceContent::Delta(text));
            }
            if let Some(text) = choice.message.and_then(|m| m.content) {
                choices.push(ChoiceContent::Message(text));
            }
        }
        Self { choices }
    }
}

#[cfg_attr(not(feature = "github"), allow(dead_code))]
impl WireChunk {
    pub(crate) fn parse(body: &str) -> Result<CompletionChunk, ProviderError> {
        serde_json::from_str::<WireChunk>(body)
            .map(CompletionChunk::from)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Completion fragments; `None` marks end of stream.
pub type CompletionStream = BoxStream<'static, Result<CompletionChunk, ProviderError>>;

/// Drain a completion stream into one string.
///
/// Stops at end of stream. The first read error is returned as-is.
pub async fn collect_text(mut stream: CompletionStream) -> Result<String, ProviderError> {
    let mut text = String::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for choice in &chunk.choices {
            text.push_str(choice.text());
        }
        chunks += 1;
    }
    tracing::debug!(chunks, chars = text.len(), "Completion stream drained");
    Ok(text)
}

/// Provider abstraction allows swapping LLM backends.
///
/// Every LLM call in pex goes through this trait.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Start a chat completion and return its fragment stream.
    ///
    /// Errors returned here are request setup failures; errors inside the
    /// stream are read failures.
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionStream, ProviderError>;

    /// Get provider name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_chat_message_creation() {
        let system = ChatMessage::system("You are a helpful assistant.");
        assert_eq!(system.role, "system");

        let user = ChatMessage::user("Hello!");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn test_config_default() {
        let config = CompletionConfig::default();
        assert_eq!(config.model, "openai/gpt-4o");
        assert!(!config.stream);
        assert!(config.org.is_none());
    }

    #[test]
    fn test_config_empty_org_is_none() {
        let config = CompletionConfig::new("m").with_org(Some(String::new()));
        assert!(config.org.is_none());

        let config = CompletionConfig::new("m").with_org(Some("octo-org".to_string()));
        assert_eq!(config.org.as_deref(), Some("octo-org"));
    }

    #[test]
    fn test_wire_batch_body() {
        let chunk = WireChunk::parse(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"RULE: a"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk, CompletionChunk::message("RULE: a"));
    }

    #[test]
    fn test_wire_stream_delta() {
        let chunk =
            WireChunk::parse(r#"{"choices":[{"index":0,"delta":{"content":"RU"}}]}"#).unwrap();
        assert_eq!(chunk, CompletionChunk::delta("RU"));
    }

    #[test]
    fn test_wire_both_fields_delta_first() {
        let chunk = WireChunk::parse(
            r#"{"choices":[{"delta":{"content":"a"},"message":{"content":"b"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            chunk.choices,
            vec![
                ChoiceContent::Delta("a".to_string()),
                ChoiceContent::Message("b".to_string())
            ]
        );
        assert_eq!(chunk.text(), "ab");
    }

    #[test]
    fn test_wire_missing_content() {
        let chunk = WireChunk::parse(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(chunk.choices.is_empty());

        let chunk = WireChunk::parse(r#"{"usage":{"total_tokens":3}}"#).unwrap();
        assert!(chunk.choices.is_empty());
    }

    #[test]
    fn test_wire_invalid_json() {
        assert!(matches!(
            WireChunk::parse("not json"),
            Err(ProviderError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_collect_mixed_modes() {
        let chunks: Vec<Result<CompletionChunk, ProviderError>> = vec![
            Ok(CompletionChunk::delta("RULE: out")),
            Ok(CompletionChunk::delta("put should be JSON\n")),
            Ok(CompletionChunk::message("RULE: be brief")),
        ];
        let text = collect_text(stream::iter(chunks).boxed()).await.unwrap();
        assert_eq!(text, "RULE: output should be JSON\nRULE: be brief");
    }

    #[tokio::test]
    async fn test_collect_propagates_read_error() {
        let chunks: Vec<Result<CompletionChunk, ProviderError>> = vec![
            Ok(CompletionChunk::delta("RULE: a\n")),
            Err(ProviderError::StreamError("connection reset".to_string())),
            Ok(CompletionChunk::delta("RULE: b\n")),
        ];
        let result = collect_text(stream::iter(chunks).boxed()).await;
        assert!(matches!(result, Err(ProviderError::StreamError(_))));
    }

    #[tokio::test]
    async fn test_collect_empty_stream() {
        let empty = stream::empty::<Result<CompletionChunk, ProviderError>>();
        let text = collect_text(empty.boxed()).await.unwrap();
        assert!(text.is_empty());
    }
}
