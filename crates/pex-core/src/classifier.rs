//! Rule classification.
//!
//! Each rule is matched against an ordered table of keyword patterns. The
//! first pattern that matches decides the category, so a rule mentioning
//! both JSON and length ("a short JSON object") is a JSON rule. Rules that
//! match nothing are generic.
//!
//! Matching is plain case-insensitive substring search. A rule that is
//! about JSON or length but avoids every keyword is classified generic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rules::Rule;

/// Evaluator template family for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Output format must be JSON
    Json,

    /// Output size is constrained
    Length,

    /// Anything else
    Generic,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Json => write!(f, "json"),
            RuleCategory::Length => write!(f, "length"),
            RuleCategory::Generic => write!(f, "generic"),
        }
    }
}

lazy_static! {
    /// JSON format keywords
    pub static ref JSON_PATTERN: Regex = Regex::new(
        r"(?i)json|javascript|object|notation"
    ).unwrap();

    /// Length constraint keywords
    pub static ref LENGTH_PATTERN: Regex = Regex::new(
        r"(?i)length|long|short|brief|concise|characters|words"
    ).unwrap();

    /// Patterns in priority order. Earlier entries win ties.
    static ref CLASSIFIERS: [(&'static Regex, RuleCategory); 2] = [
        (&*JSON_PATTERN, RuleCategory::Json),
        (&*LENGTH_PATTERN, RuleCategory::Length),
    ];
}

/// Check if a rule talks about JSON output.
pub fn is_json_rule(rule: &str) -> bool {
    JSON_PATTERN.is_match(rule)
}

/// Check if a rule talks about output length.
pub fn is_length_rule(rule: &str) -> bool {
    LENGTH_PATTERN.is_match(rule)
}

/// Classify rule text into a [`RuleCategory`].
pub fn classify(rule: &str) -> RuleCategory {
    CLASSIFIERS
        .iter()
        .find(|(pattern, _)| pattern.is_match(rule))
        .map(|(_, category)| *category)
        .unwrap_or(RuleCategory::Generic)
}

impl Rule {
    /// Category of this rule.
    pub fn category(&self) -> RuleCategory {
        classify(self.as_str())
    }
}
