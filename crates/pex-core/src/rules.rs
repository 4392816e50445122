//! Output rules and the `RULE:` line parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker that prefixes every rule line in an extraction response.
pub const RULE_MARKER: &str = "RULE:";

/// Sentinel the model returns when a prompt states no rules.
pub const NO_RULES_SENTINEL: &str = "NO_RULES";

/// Rules substituted when extraction finds nothing.
pub const FALLBACK_RULES: [&str; 2] = [
    "Response should be coherent and relevant",
    "Response should be in proper language",
];

/// A constraint a prompt places on acceptable model output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(String);

impl Rule {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rule {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Rule {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse `RULE:` lines out of a model response, in order of appearance.
///
/// Lines without the marker (including [`NO_RULES_SENTINEL`]) are skipped,
/// as are marker lines with nothing after them. May return an empty list;
/// see [`parse_rules_or_fallback`].
pub fn parse_rules(response: &str) -> Vec<Rule> {
    response
        .lines()
        .filter_map(|line| line.trim().strip_prefix(RULE_MARKER))
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(Rule::new)
        .collect()
}

/// The generic rules used when a response yields none.
pub fn fallback_rules() -> Vec<Rule> {
    FALLBACK_RULES.iter().copied().map(Rule::new).collect()
}

/// Parse rules, substituting [`FALLBACK_RULES`] when none are found.
pub fn parse_rules_or_fallback(response: &str) -> Vec<Rule> {
    let rules = parse_rules(response);
    if rules.is_empty() {
        tracing::warn!("No RULE: lines in response, using generic rules");
        return fallback_rules();
    }
    rules
}
