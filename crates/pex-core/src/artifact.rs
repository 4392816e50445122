//! Eval file assembly and export.
//!
//! An [`EvalArtifact`] is the document handed to `gh models eval`: test
//! data, a two-message conversation template, and the evaluator list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::evaluators::Evaluator;
use crate::schema::validate_eval_file_schema;
use crate::test_cases::TestCase;

/// Name given to every generated eval file.
pub const ARTIFACT_NAME: &str = "Generated PromptPex Tests";

/// Description given to every generated eval file.
pub const ARTIFACT_DESCRIPTION: &str = "Automatically generated test cases for prompt validation";

/// System message of the conversation template.
pub const TEMPLATE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that follows the given instructions precisely.";

/// Appended to the prompt to form the user message of the template.
pub const INPUT_SUFFIX: &str = "\n\nInput: {{input}}";

/// Errors from validating or exporting an eval file.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to write eval file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to convert to YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to convert to JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Eval file validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// A message of the conversation template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// "system", "user" or "assistant"
    pub role: String,

    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The exportable eval file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalArtifact {
    pub name: String,

    pub description: String,

    /// Model the prompt under test runs on
    pub model: String,

    /// One row per test case
    pub test_data: Vec<TestCase>,

    /// Conversation template; the user message carries `{{input}}`
    pub messages: Vec<Message>,

    pub evaluators: Vec<Evaluator>,
}

impl EvalArtifact {
    /// Assemble an eval file. Inputs are attached unchanged.
    pub fn build(
        prompt_text: &str,
        test_cases: Vec<TestCase>,
        evaluators: Vec<Evaluator>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: ARTIFACT_NAME.to_string(),
            description: ARTIFACT_DESCRIPTION.to_string(),
            model: model.into(),
            test_data: test_cases,
            messages: vec![
                Message::system(TEMPLATE_SYSTEM_PROMPT),
                Message::user(format!("{}{}", prompt_text, INPUT_SUFFIX)),
            ],
            evaluators,
        }
    }

    /// Check the document against the eval file schema and for duplicate
    /// evaluator names.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let value = serde_json::to_value(self)?;
        let mut errors = validate_eval_file_schema(&value).err().unwrap_or_default();

        let mut seen = HashSet::new();
        for evaluator in &self.evaluators {
            if !seen.insert(evaluator.name.as_str()) {
                errors.push(format!("Duplicate evaluator name: {}", evaluator.name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ArtifactError::Invalid(errors))
        }
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ArtifactError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse an eval file from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ArtifactError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate, serialize and write the eval file to `path`.
    pub fn write_yaml_file(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        self.validate()?;
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)?;
        tracing::info!(path = %path.as_ref().display(), "Wrote eval file");
        Ok(())
    }
}
