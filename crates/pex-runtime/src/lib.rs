//! # pex-runtime
//!
//! The model-facing half of pex.
//!
//! `pex-core` owns everything deterministic: parsing model responses,
//! classifying rules, building evaluators and the eval file. This crate
//! makes the two completion requests that feed it, through the
//! [`LlmProvider`] trait, and wires the stages into a [`PexPipeline`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use pex_runtime::{CompletionConfig, GitHubModelsProvider, PexPipelineBuilder};
//! use std::sync::Arc;
//!
//! let provider = GitHubModelsProvider::from_env()?;
//!
//! let pipeline = PexPipelineBuilder::new()
//!     .provider(Arc::new(provider))
//!     .config(CompletionConfig::new("openai/gpt-4o"))
//!     .build()?;
//!
//! let output = pipeline.run("Summarize {{input}} in one sentence.").await?;
//! output.artifact.write_yaml_file("generated_tests.yml")?;
//! ```

pub mod extractor;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod synthesizer;

pub use extractor::RuleExtractor;
pub use pipeline::{PexPipeline, PexPipelineBuilder, PipelineOutput, RuntimeError};
pub use providers::{
    collect_text, ChatMessage, ChoiceContent, CompletionChunk, CompletionConfig,
    CompletionStream, GitHubToken, LlmProvider, ProviderError,
};
pub use synthesizer::TestCaseSynthesizer;

#[cfg(feature = "github")]
pub use providers::GitHubModelsProvider;
