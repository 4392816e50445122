//! Test case generation for a prompt and its rules.

use std::sync::Arc;

use pex_core::{parse_test_cases_or_fallback, Rule, TestCase};

use crate::prompts::{test_generation_prompt, TEST_GENERATION_SYSTEM_PROMPT};
use crate::providers::{collect_text, ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// Generates [`TestCase`]s with one completion request.
pub struct TestCaseSynthesizer {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
}

impl TestCaseSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    /// Generate test cases for `prompt` given its `rules`.
    ///
    /// Never returns an empty list; see [`TestCase::fallback`].
    pub async fn synthesize(
        &self,
        prompt: &str,
        rules: &[Rule],
    ) -> Result<Vec<TestCase>, ProviderError> {
        let messages = vec![
            ChatMessage::system(TEST_GENERATION_SYSTEM_PROMPT),
            ChatMessage::user(test_generation_prompt(prompt, rules)),
        ];

        tracing::debug!(
            provider = self.provider.name(),
            model = %self.config.model,
            rules = rules.len(),
            "Requesting test case generation"
        );
        let stream = self
            .provider
            .stream_completion(messages, &self.config)
            .await?;
        let response = collect_text(stream).await?;

        Ok(parse_test_cases_or_fallback(&response))
    }
}
