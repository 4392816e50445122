//! Prompts for the two model calls pex makes.
//!
//! Both responses are parsed line by line, so the instructions pin the
//! exact markers the parsers in `pex_core` look for (`RULE:`, `INPUT:`,
//! `DESCRIPTION:`).

use pex_core::Rule;

/// System message for rule extraction.
pub const RULE_EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an expert at analyzing prompts and extracting output rules and constraints.";

/// Instruction prepended to the analyzed prompt.
pub const RULE_EXTRACTION_INSTRUCTIONS: &str = r#"Analyze the following prompt and extract any output rules or constraints mentioned.
Look for phrases like:
- "output should be JSON"
- "respond with a list"
- "format as XML"
- "use markdown"
- "include specific fields"
- "follow a certain structure"
- "return only numbers"
- etc.

Return each rule on a separate line, starting with "RULE:". If no rules are found, return "NO_RULES".

Prompt to analyze:
"#;

/// System message for test case generation.
pub const TEST_GENERATION_SYSTEM_PROMPT: &str =
    "You are an expert at generating test cases for prompts.";

/// User message for rule extraction: the instructions followed directly by
/// the prompt text.
pub fn rule_extraction_prompt(prompt: &str) -> String {
    format!("{RULE_EXTRACTION_INSTRUCTIONS}{prompt}")
}

/// User message for test case generation.
pub fn test_generation_prompt(prompt: &str, rules: &[Rule]) -> String {
    let rules = rules
        .iter()
        .map(Rule::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following prompt and its output rules, generate 3-5 test cases that would help verify the prompt works correctly.

Prompt:
{prompt}

Output Rules:
{rules}

For each test case, provide:
1. An input value that would test the prompt
2. A brief description of what this test case validates

Format each test case as:
INPUT: [input value]
DESCRIPTION: [what this tests]

Generate diverse test cases that cover different scenarios and edge cases."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_ends_with_input() {
        let message = rule_extraction_prompt("Summarize {{input}} in JSON.");
        assert!(message.starts_with("Analyze the following prompt"));
        assert!(message.ends_with("Prompt to analyze:\nSummarize {{input}} in JSON."));
    }

    #[test]
    fn test_extraction_prompt_names_markers() {
        assert!(RULE_EXTRACTION_INSTRUCTIONS.contains(r#"starting with "RULE:""#));
        assert!(RULE_EXTRACTION_INSTRUCTIONS.contains(r#"return "NO_RULES""#));
    }

    #[test]
    fn test_generation_prompt_lists_rules_one_per_line() {
        let rules = vec![Rule::new("Output must be JSON"), Rule::new("Keep it brief")];
        let message = test_generation_prompt("Describe {{input}}", &rules);

        assert!(message.contains("Prompt:\nDescribe {{input}}\n"));
        assert!(message.contains("Output Rules:\nOutput must be JSON\nKeep it brief\n"));
        assert!(message.contains("INPUT: [input value]\nDESCRIPTION: [what this tests]"));
    }

    #[test]
    fn test_generation_prompt_without_rules() {
        let message = test_generation_prompt("p", &[]);
        assert!(message.contains("Output Rules:\n\n"));
    }
}
