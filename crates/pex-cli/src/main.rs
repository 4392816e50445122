//! pex - generate eval test files from a prompt.
//!
//! Reads a prompt (inline or from a file), asks a model which output
//! rules it states, generates test inputs, and writes a YAML eval file
//! with one grader per rule plus a coherence check.
//!
//! ```text
//! pex --prompt "Summarize {{input}} in JSON" --output summary.yml
//! pex --file prompt.txt --model openai/gpt-4o-mini --org octo-org --stream
//! ```

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use pex_core::{PromptSource, DEFAULT_MODEL, DEFAULT_OUTPUT_FILE};
use pex_runtime::{CompletionConfig, GitHubModelsProvider, PexPipelineBuilder};

#[derive(Parser, Debug)]
#[command(name = "pex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate tests and evaluators for a prompt", long_about = None)]
struct Cli {
    /// Prompt text to analyze
    #[arg(short, long)]
    prompt: Option<String>,

    /// File containing the prompt to analyze
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Model used for generation and grading
    #[arg(
        short,
        long,
        default_value = DEFAULT_MODEL,
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    model: String,

    /// Output file for the generated tests
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Organization to attribute model usage to
    #[arg(long)]
    org: Option<String>,

    /// Request streamed responses
    #[arg(long)]
    stream: bool,

    /// Per-request timeout, e.g. "30s" or "2m". Covers the whole response,
    /// so a streamed reply still running when it expires is cut off.
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Override the models API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn completion_config(&self) -> CompletionConfig {
        CompletionConfig::new(&self.model)
            .with_stream(self.stream)
            .with_org(self.org.clone())
            .with_timeout(self.timeout)
    }

    /// GitHub Models client; the token comes from `GITHUB_TOKEN`.
    fn provider(&self) -> Result<GitHubModelsProvider> {
        let provider = GitHubModelsProvider::from_env()?;
        Ok(match &self.endpoint {
            Some(url) => provider.with_base_url(url)?,
            None => provider,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let prompt = load_prompt(cli.prompt.clone(), cli.file.clone())?;

    let provider = cli.provider().context("failed to create model client")?;

    let pipeline = PexPipelineBuilder::new()
        .provider(Arc::new(provider))
        .config(cli.completion_config())
        .build()?;

    println!("Analyzing prompt to extract output rules...");
    let output = pipeline.run(&prompt).await?;
    println!("Found {} output rules", output.rules.len());
    println!("Generated {} test cases", output.artifact.test_data.len());

    save(&output.artifact, &cli.output)?;
    println!("✓ Generated test file: {}", cli.output.display());
    println!("Run with: gh models eval {}", cli.output.display());

    Ok(())
}

/// Resolve and read the prompt. Fails before any model call when both or
/// neither source is given.
fn load_prompt(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let source = PromptSource::from_options(text, file)?;
    source.load().context("failed to load prompt text")
}

fn save(artifact: &pex_core::EvalArtifact, path: &Path) -> Result<()> {
    artifact
        .write_yaml_file(path)
        .context("failed to save evaluation file")
}
