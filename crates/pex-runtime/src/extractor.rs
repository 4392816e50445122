//! Rule extraction: ask the model which output rules a prompt states.

use std::sync::Arc;

use pex_core::{parse_rules_or_fallback, Rule};

use crate::prompts::{rule_extraction_prompt, RULE_EXTRACTION_SYSTEM_PROMPT};
use crate::providers::{collect_text, ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// Extracts [`Rule`]s from a prompt with one completion request.
pub struct RuleExtractor {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
}

impl RuleExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    /// Extract the prompt's output rules.
    ///
    /// Never returns an empty list: a response without `RULE:` lines yields
    /// the generic fallback rules. Transport and stream read failures are
    /// returned unchanged.
    pub async fn extract(&self, prompt: &str) -> Result<Vec<Rule>, ProviderError> {
        let messages = vec![
            ChatMessage::system(RULE_EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(rule_extraction_prompt(prompt)),
        ];

        tracing::debug!(
            provider = self.provider.name(),
            model = %self.config.model,
            "Requesting rule extraction"
        );
        let stream = self
            .provider
            .stream_completion(messages, &self.config)
            .await?;
        let response = collect_text(stream).await?;

        Ok(parse_rules_or_fallback(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionChunk, CompletionStream};
    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};
    use std::sync::Mutex;

    /// Replies with fixed chunks and records the messages it was sent.
    struct CannedProvider {
        chunks: Vec<CompletionChunk>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl CannedProvider {
        fn new(chunks: Vec<CompletionChunk>) -> Arc<Self> {
            Arc::new(Self {
                chunks,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn stream_completion(
            &self,
            messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionStream, ProviderError> {
            self.seen.lock().unwrap().extend(messages);
            let items: Vec<Result<CompletionChunk, ProviderError>> =
                self.chunks.iter().cloned().map(Ok).collect();
            Ok(stream::iter(items).boxed())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn stream_completion(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionStream, ProviderError> {
            Err(ProviderError::AuthError)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_extracts_rules_in_order() {
        let provider = CannedProvider::new(vec![CompletionChunk::message(
            "RULE: output should be JSON\nRULE: keep response under 50 words\n",
        )]);
        let extractor = RuleExtractor::new(provider, CompletionConfig::default());

        let rules = extractor.extract("Describe {{input}}").await.unwrap();
        assert_eq!(
            rules,
            vec![
                Rule::new("output should be JSON"),
                Rule::new("keep response under 50 words")
            ]
        );
    }

    #[tokio::test]
    async fn test_sends_system_and_analysis_messages() {
        let provider = CannedProvider::new(vec![CompletionChunk::message("NO_RULES")]);
        let extractor = RuleExtractor::new(provider.clone(), CompletionConfig::default());

        extractor.extract("Say hi to {{input}}").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChatMessage::system(RULE_EXTRACTION_SYSTEM_PROMPT));
        assert_eq!(seen[1].role, "user");
        assert!(seen[1].content.ends_with("Prompt to analyze:\nSay hi to {{input}}"));
    }

    #[tokio::test]
    async fn test_no_rules_falls_back() {
        let provider = CannedProvider::new(vec![CompletionChunk::message("NO_RULES")]);
        let extractor = RuleExtractor::new(provider, CompletionConfig::default());

        let rules = extractor.extract("p").await.unwrap();
        assert_eq!(rules, pex_core::fallback_rules());
    }

    #[tokio::test]
    async fn test_rule_split_across_deltas() {
        let provider = CannedProvider::new(vec![
            CompletionChunk::delta("RU"),
            CompletionChunk::delta("LE: use mark"),
            CompletionChunk::delta("down\n"),
        ]);
        let extractor = RuleExtractor::new(provider, CompletionConfig::default());

        let rules = extractor.extract("p").await.unwrap();
        assert_eq!(rules, vec![Rule::new("use markdown")]);
    }

    #[tokio::test]
    async fn test_request_failure_propagates() {
        let extractor = RuleExtractor::new(Arc::new(FailingProvider), CompletionConfig::default());
        let result = extractor.extract("p").await;
        assert!(matches!(result, Err(ProviderError::AuthError)));
    }
}
