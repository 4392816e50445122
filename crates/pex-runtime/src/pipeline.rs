//! The generation pipeline: prompt in, eval file out.
//!
//! Stages run strictly in sequence:
//! 1. Rule extraction (one model call)
//! 2. Test case generation (one model call)
//! 3. Evaluator synthesis (deterministic, `pex_core`)
//! 4. Artifact assembly (deterministic, `pex_core`)
//!
//! A provider failure in either model call aborts the run; nothing after
//! the failing stage executes.

use std::sync::Arc;
use thiserror::Error;

use pex_core::{build_evaluators, EvalArtifact, Rule};

use crate::extractor::RuleExtractor;
use crate::providers::{CompletionConfig, LlmProvider, ProviderError};
use crate::synthesizer::TestCaseSynthesizer;

/// Errors from a pipeline run, tagged with the failing stage.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("failed to extract output rules: {0}")]
    RuleExtraction(#[source] ProviderError),

    #[error("failed to generate test cases: {0}")]
    TestGeneration(#[source] ProviderError),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rules the eval file's evaluators were built from
    pub rules: Vec<Rule>,

    /// The eval file, ready to validate and write
    pub artifact: EvalArtifact,
}

/// Runs the generation stages against one provider and model.
pub struct PexPipeline {
    extractor: RuleExtractor,
    synthesizer: TestCaseSynthesizer,
    config: CompletionConfig,
}

impl PexPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self {
            extractor: RuleExtractor::new(provider.clone(), config.clone()),
            synthesizer: TestCaseSynthesizer::new(provider, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Generate an eval file for `prompt`.
    pub async fn run(&self, prompt: &str) -> Result<PipelineOutput, RuntimeError> {
        tracing::info!(model = %self.config.model, "Analyzing prompt to extract output rules");
        let rules = self
            .extractor
            .extract(prompt)
            .await
            .map_err(RuntimeError::RuleExtraction)?;
        tracing::info!(count = rules.len(), "Found output rules");

        tracing::info!("Generating test cases");
        let test_cases = self
            .synthesizer
            .synthesize(prompt, &rules)
            .await
            .map_err(RuntimeError::TestGeneration)?;
        tracing::info!(count = test_cases.len(), "Generated test cases");

        let evaluators = build_evaluators(&rules, &self.config.model);
        let artifact = EvalArtifact::build(prompt, test_cases, evaluators, &self.config.model);

        Ok(PipelineOutput { rules, artifact })
    }
}

/// Builder for PexPipeline.
pub struct PexPipelineBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: CompletionConfig,
}

impl PexPipelineBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: CompletionConfig::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the completion configuration.
    pub fn config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<PexPipeline, RuntimeError> {
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No provider set".to_string()))?;

        Ok(PexPipeline::new(provider, self.config))
    }
}

impl Default for PexPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
