//! # pex-core
//!
//! Deterministic half of prompt test generation.
//!
//! Given the raw text an LLM returned for the rule-extraction and
//! test-generation requests, this crate turns it into an eval file:
//! - Parse `RULE:` lines into [`Rule`]s
//! - Parse `INPUT:`/`DESCRIPTION:` pairs into [`TestCase`]s
//! - Classify each rule and build its [`Evaluator`]
//! - Assemble and export the [`EvalArtifact`]
//!
//! ## Key Guarantees
//!
//! 1. **No LLM calls**: everything here is a pure function of its input
//! 2. **Never empty**: rule and test case parsing fall back to defaults
//! 3. **Stable classification**: the same rule always gets the same rubric
//!
//! ## Example
//!
//! ```rust,ignore
//! use pex_core::{build_evaluators, parse_rules_or_fallback, parse_test_cases_or_fallback, EvalArtifact};
//!
//! let rules = parse_rules_or_fallback("RULE: output should be JSON");
//! let cases = parse_test_cases_or_fallback("INPUT: Ada\nDESCRIPTION: a plain name");
//! let evaluators = build_evaluators(&rules, "openai/gpt-4o");
//!
//! let artifact = EvalArtifact::build("Describe the user as JSON.", cases, evaluators, "openai/gpt-4o");
//! artifact.write_yaml_file("generated_tests.yml")?;
//! ```

pub mod artifact;
pub mod classifier;
pub mod evaluators;
pub mod rules;
pub mod schema;
pub mod source;
pub mod test_cases;

// Re-export main types at crate root
pub use artifact::{ArtifactError, EvalArtifact, Message};
pub use classifier::{classify, RuleCategory};
pub use evaluators::{build_evaluators, Choice, Evaluator, LlmEvaluator};
pub use rules::{fallback_rules, parse_rules, parse_rules_or_fallback, Rule};
pub use source::{PromptSource, SourceError};
pub use test_cases::{
    parse_test_cases, parse_test_cases_or_fallback, ParseState, TestCase, TestCaseParser,
};

/// Default model for generation and grading.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Default output path for the eval file.
pub const DEFAULT_OUTPUT_FILE: &str = "generated_tests.yml";
