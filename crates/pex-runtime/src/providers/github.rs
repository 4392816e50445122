//! GitHub Models provider implementation.
//!
//! Talks to the OpenAI-compatible chat completions endpoint of GitHub
//! Models, in batch or server-sent-event streaming mode. Usage can be
//! attributed to an organization, which switches the endpoint to
//! `/orgs/<org>/inference/chat/completions`.

use super::{
    secrets::GitHubToken, sse::SseBuffer, ChatMessage, CompletionConfig, CompletionStream,
    LlmProvider, ProviderError, WireChunk,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default GitHub Models API root.
pub const DEFAULT_BASE_URL: &str = "https://models.github.ai";

/// GitHub Models chat completion provider.
pub struct GitHubModelsProvider {
    token: GitHubToken,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitHubModelsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubModelsProvider")
            .field("token", &self.token)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GitHubModelsProvider {
    pub fn new(token: GitHubToken) -> Self {
        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create with the token from `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(GitHubToken::from_env()?))
    }

    /// Point the provider at another API root, e.g. a proxy.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ProviderError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(format!(
                "base URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Chat completions URL, attributed to `org` when given.
    fn endpoint(&self, org: Option<&str>) -> String {
        match org {
            Some(org) => format!("{}/orgs/{}/inference/chat/completions", self.base_url, org),
            None => format!("{}/inference/chat/completions", self.base_url),
        }
    }
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Body read failure. The request timeout spans the whole body, so a
/// stream cut off by it reports `Timeout`.
fn body_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::StreamError(e.to_string())
    }
}

#[async_trait]
impl LlmProvider for GitHubModelsProvider {
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionStream, ProviderError> {
        let url = self.endpoint(config.org.as_deref());
        let request = ChatRequest {
            model: &config.model,
            messages: &messages,
            stream: config.stream,
        };
        tracing::debug!(
            url = %url,
            model = %config.model,
            stream = config.stream,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose())
            .header("accept", "application/json")
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        if config.stream {
            return Ok(sse_completion_stream(response, config.timeout));
        }

        let body = response
            .text()
            .await
            .map_err(|e| body_error(e, config.timeout))?;
        let chunk = WireChunk::parse(&body)?;
        Ok(stream::once(async move { Ok(chunk) }).boxed())
    }

    fn name(&self) -> &str {
        "github"
    }
}

struct SseState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    buffer: SseBuffer,
    timeout: Duration,
    done: bool,
}

/// Turn an event-stream response into completion chunks. `[DONE]` or the
/// end of the body ends the stream; a body or parse error is yielded once
/// and then the stream ends.
fn sse_completion_stream(response: reqwest::Response, timeout: Duration) -> CompletionStream {
    let state = SseState {
        body: response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed(),
        buffer: SseBuffer::default(),
        timeout,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(data) = state.buffer.next_data() {
                if data.trim() == "[DONE]" {
                    state.done = true;
                    continue;
                }
                let item = WireChunk::parse(&data);
                state.done = item.is_err();
                return Some((item, state));
            }

            match state.body.next().await {
                Some(Ok(bytes)) => state.buffer.push(&bytes),
                Some(Err(e)) => {
                    state.done = true;
                    let err = body_error(e, state.timeout);
                    return Some((Err(err), state));
                }
                None => {
                    state.done = true;
                    match state.buffer.finish() {
                        Some(data) if data.trim() != "[DONE]" => {
                            return Some((WireChunk::parse(&data), state));
                        }
                        _ => return None,
                    }
                }
            }
        }
    })
    .boxed()
}
