//! Evaluator synthesis.
//!
//! Every rule becomes one LLM-graded evaluator named `rule-<n>` whose
//! rubric depends on the rule's [`RuleCategory`]. A reference to the
//! built-in coherence check is appended last, so an eval file always has
//! `rules.len() + 1` evaluators.

use serde::{Deserialize, Serialize};

use crate::classifier::RuleCategory;
use crate::rules::Rule;

/// Name of the trailing coherence evaluator.
pub const COHERENCE_EVALUATOR_NAME: &str = "coherence";

/// Built-in evaluator the coherence entry refers to.
pub const COHERENCE_EVALUATOR_USES: &str = "github/coherence";

/// Placeholder the eval runner replaces with the graded completion.
pub const COMPLETION_PLACEHOLDER: &str = "{{completion}}";

const JSON_SYSTEM_PROMPT: &str = "You are evaluating whether a response follows JSON format rules.";
const LENGTH_SYSTEM_PROMPT: &str = "You are evaluating whether a response meets length requirements.";
const GENERIC_SYSTEM_PROMPT: &str =
    "You are evaluating whether a response follows the specified rule.";

/// One answer a grader may give, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub choice: String,
    pub score: f64,
}

impl Choice {
    pub fn new(choice: impl Into<String>, score: f64) -> Self {
        Self {
            choice: choice.into(),
            score,
        }
    }
}

/// The `yes`/`no` choice set shared by every generated evaluator.
pub fn binary_choices() -> Vec<Choice> {
    vec![Choice::new("yes", 1.0), Choice::new("no", 0.0)]
}

/// An inline LLM-graded rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmEvaluator {
    /// Model that grades the completion
    pub model_id: String,

    /// Grader system prompt
    pub system_prompt: String,

    /// Grader user prompt, containing `{{completion}}`
    pub prompt: String,

    pub choices: Vec<Choice>,
}

/// A named grading strategy in an eval file.
///
/// Exactly one of `llm` or `uses` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluator {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmEvaluator>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
}

impl Evaluator {
    /// Create an inline LLM evaluator.
    pub fn llm(name: impl Into<String>, llm: LlmEvaluator) -> Self {
        Self {
            name: name.into(),
            llm: Some(llm),
            uses: None,
        }
    }

    /// Create a reference to a named built-in evaluator.
    pub fn reference(name: impl Into<String>, uses: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            llm: None,
            uses: Some(uses.into()),
        }
    }

    /// The fixed coherence evaluator.
    pub fn coherence() -> Self {
        Self::reference(COHERENCE_EVALUATOR_NAME, COHERENCE_EVALUATOR_USES)
    }

    /// Build the evaluator for a single rule.
    ///
    /// `index` is 1-based and becomes part of the name.
    pub fn for_rule(index: usize, rule: &Rule, model_id: &str) -> Self {
        let category = rule.category();
        let (system_prompt, prompt) = rubric(category, rule);
        tracing::debug!(index, %category, rule = %rule, "Built evaluator");

        Self::llm(
            format!("rule-{}", index),
            LlmEvaluator {
                model_id: model_id.to_string(),
                system_prompt: system_prompt.to_string(),
                prompt,
                choices: binary_choices(),
            },
        )
    }

    pub fn is_reference(&self) -> bool {
        self.uses.is_some()
    }
}

/// System prompt and user prompt template for a category.
fn rubric(category: RuleCategory, rule: &Rule) -> (&'static str, String) {
    match category {
        RuleCategory::Json => (
            JSON_SYSTEM_PROMPT,
            format!(
                "Does this response follow proper JSON format? Response: {}",
                COMPLETION_PLACEHOLDER
            ),
        ),
        RuleCategory::Length => (
            LENGTH_SYSTEM_PROMPT,
            format!(
                "Does this response meet the length requirements described in: '{}'? Response: {}",
                rule, COMPLETION_PLACEHOLDER
            ),
        ),
        RuleCategory::Generic => (
            GENERIC_SYSTEM_PROMPT,
            format!(
                "Does this response follow the rule: '{}'? Response: {}",
                rule, COMPLETION_PLACEHOLDER
            ),
        ),
    }
}

/// Build one evaluator per rule, then the coherence evaluator.
pub fn build_evaluators(rules: &[Rule], model_id: &str) -> Vec<Evaluator> {
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| Evaluator::for_rule(i + 1, rule, model_id))
        .chain(std::iter::once(Evaluator::coherence()))
        .collect()
}
