//! Where the prompt under test comes from.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors resolving or reading the prompt source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("either --prompt or --file must be specified")]
    Missing,

    #[error("cannot specify both --prompt and --file")]
    Conflicting,

    #[error("failed to read prompt file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The prompt under test: literal text or a file to read it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Text(String),
    File(PathBuf),
}

impl PromptSource {
    /// Resolve exactly one source from optional text and file arguments.
    ///
    /// Empty values count as absent.
    pub fn from_options(
        text: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self, SourceError> {
        let text = text.filter(|t| !t.is_empty());
        let file = file.filter(|f| !f.as_os_str().is_empty());

        match (text, file) {
            (Some(_), Some(_)) => Err(SourceError::Conflicting),
            (Some(text), None) => Ok(PromptSource::Text(text)),
            (None, Some(path)) => Ok(PromptSource::File(path)),
            (None, None) => Err(SourceError::Missing),
        }
    }

    /// Load the prompt text. File contents are decoded as UTF-8, replacing
    /// invalid sequences.
    pub fn load(&self) -> Result<String, SourceError> {
        match self {
            PromptSource::Text(text) => Ok(text.clone()),
            PromptSource::File(path) => read_prompt_file(path),
        }
    }
}

fn read_prompt_file(path: &Path) -> Result<String, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read prompt file");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
