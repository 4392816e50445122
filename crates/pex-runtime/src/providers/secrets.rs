//! The GitHub token used to call GitHub Models.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Environment variable the token is read from.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A GitHub token. Never printed; zeroed on drop.
pub struct GitHubToken(SecretString);

impl GitHubToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Read the token from `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_value(std::env::var(GITHUB_TOKEN_ENV).ok())
    }

    /// A missing or blank value is a configuration error.
    fn from_value(value: Option<String>) -> Result<Self, ProviderError> {
        match value {
            Some(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            _ => Err(ProviderError::NotConfigured(format!(
                "GitHub token required: set the {} environment variable",
                GITHUB_TOKEN_ENV
            ))),
        }
    }

    /// The raw token, for the `Authorization` header only.
    #[cfg_attr(not(feature = "github"), allow(dead_code))]
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken([REDACTED])")
    }
}
