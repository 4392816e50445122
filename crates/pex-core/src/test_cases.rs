//! Test cases and the `INPUT:`/`DESCRIPTION:` response parser.
//!
//! The parser is a two-state machine. An `INPUT:` line arms it with a
//! pending input; a `DESCRIPTION:` line completes the pair and emits a
//! [`TestCase`]. Anything out of order is dropped rather than rejected, so a
//! sloppy model response yields fewer cases instead of an error.

use serde::{Deserialize, Serialize};

/// Marker for the input line of a test case.
pub const INPUT_MARKER: &str = "INPUT:";

/// Marker for the description line of a test case.
pub const DESCRIPTION_MARKER: &str = "DESCRIPTION:";

/// Input of the test case substituted when parsing yields nothing.
pub const FALLBACK_INPUT: &str = "test input";

/// Description of the test case substituted when parsing yields nothing.
pub const FALLBACK_DESCRIPTION: &str = "Basic functionality test";

/// One row of test data: a value to feed the prompt and why it matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub description: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            description: description.into(),
        }
    }

    /// The single case used when a response yields none.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_INPUT, FALLBACK_DESCRIPTION)
    }
}

/// Parser state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseState {
    /// No input is pending; a description here is dropped.
    #[default]
    AwaitingInput,

    /// An input was read and waits for its description.
    AwaitingDescription { input: String },
}

/// A classified response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Input(&'a str),
    Description(&'a str),
    Other,
}

impl<'a> Line<'a> {
    fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if let Some(rest) = line.strip_prefix(INPUT_MARKER) {
            Line::Input(rest.trim())
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_MARKER) {
            Line::Description(rest.trim())
        } else {
            Line::Other
        }
    }
}

/// Streaming parser for `INPUT:`/`DESCRIPTION:` pairs.
#[derive(Debug, Default)]
pub struct TestCaseParser {
    state: ParseState,
    cases: Vec<TestCase>,
}

impl TestCaseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, for inspection.
    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Feed one response line.
    pub fn feed_line(&mut self, raw: &str) {
        match Line::classify(raw) {
            Line::Input(input) => {
                // A fresh input replaces any unconsumed one; an empty input clears it.
                self.state = if input.is_empty() {
                    ParseState::AwaitingInput
                } else {
                    ParseState::AwaitingDescription {
                        input: input.to_string(),
                    }
                };
            }
            Line::Description(description) => match &self.state {
                ParseState::AwaitingDescription { input } if !description.is_empty() => {
                    self.cases.push(TestCase::new(input.clone(), description));
                    self.state = ParseState::AwaitingInput;
                }
                ParseState::AwaitingDescription { .. } => {
                    tracing::debug!("Empty DESCRIPTION: line, keeping pending input");
                }
                ParseState::AwaitingInput => {
                    tracing::debug!(description, "DESCRIPTION: without INPUT:, dropped");
                }
            },
            Line::Other => {}
        }
    }

    /// Finish parsing and return the emitted cases. A dangling input is discarded.
    pub fn finish(self) -> Vec<TestCase> {
        if let ParseState::AwaitingDescription { input } = &self.state {
            tracing::debug!(input = %input, "INPUT: without DESCRIPTION:, dropped");
        }
        self.cases
    }
}

/// Parse every complete pair out of a model response.
pub fn parse_test_cases(response: &str) -> Vec<TestCase> {
    let mut parser = TestCaseParser::new();
    for line in response.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Parse test cases, substituting [`TestCase::fallback`] when none are found.
pub fn parse_test_cases_or_fallback(response: &str) -> Vec<TestCase> {
    let cases = parse_test_cases(response);
    if cases.is_empty() {
        tracing::warn!("No INPUT:/DESCRIPTION: pairs in response, using default test case");
        return vec![TestCase::fallback()];
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_pairs_in_order() {
        let response = "INPUT: hello world\n\
                        DESCRIPTION: basic greeting test\n\
                        INPUT: 12345\n\
                        DESCRIPTION: numeric input test\n";
        let cases = parse_test_cases_or_fallback(response);
        assert_eq!(
            cases,
            vec![
                TestCase::new("hello world", "basic greeting test"),
                TestCase::new("12345", "numeric input test"),
            ]
        );
    }

    #[test]
    fn test_description_before_input_is_dropped() {
        let response = "DESCRIPTION: orphan\n\
                        INPUT: hello world\n\
                        DESCRIPTION: basic greeting test\n";
        assert_eq!(
            parse_test_cases(response),
            vec![TestCase::new("hello world", "basic greeting test")]
        );
    }

    #[test]
    fn test_second_input_overwrites_pending() {
        let response = "INPUT: first\nINPUT: second\nDESCRIPTION: only the latest input\n";
        assert_eq!(
            parse_test_cases(response),
            vec![TestCase::new("second", "only the latest input")]
        );
    }

    #[test]
    fn test_empty_input_clears_pending() {
        let response = "INPUT: first\nINPUT:\nDESCRIPTION: nothing to pair with\n";
        assert!(parse_test_cases(response).is_empty());
    }

    #[test]
    fn test_empty_description_keeps_pending_input() {
        let response = "INPUT: kept\nDESCRIPTION:\nDESCRIPTION: paired later\n";
        assert_eq!(
            parse_test_cases(response),
            vec![TestCase::new("kept", "paired later")]
        );
    }

    #[test]
    fn test_surrounding_prose_and_whitespace() {
        let response = "Sure! Here are some test cases:\n\n\
                        1. First case\n   INPUT:   {\"name\": \"Ada\"}  \n\
                        \tDESCRIPTION:  valid object\n\
                        That's all.";
        assert_eq!(
            parse_test_cases(response),
            vec![TestCase::new("{\"name\": \"Ada\"}", "valid object")]
        );
    }

    #[test]
    fn test_state_transitions() {
        let mut parser = TestCaseParser::new();
        assert_eq!(parser.state(), &ParseState::AwaitingInput);

        parser.feed_line("INPUT: x");
        assert_eq!(
            parser.state(),
            &ParseState::AwaitingDescription {
                input: "x".to_string()
            }
        );

        parser.feed_line("DESCRIPTION: y");
        assert_eq!(parser.state(), &ParseState::AwaitingInput);
        assert_eq!(parser.finish(), vec![TestCase::new("x", "y")]);
    }

    #[test]
    fn test_dangling_input_discarded() {
        assert!(parse_test_cases("INPUT: never described").is_empty());
    }

    #[test]
    fn test_no_pairs_falls_back() {
        let cases = parse_test_cases_or_fallback("I could not think of any tests.");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input, "test input");
        assert_eq!(cases[0].description, "Basic functionality test");
    }
}
