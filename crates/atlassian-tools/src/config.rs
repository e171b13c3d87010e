//! Connection parameters for one backend, resolved from the environment.
//!
//! Resolution is lazy: nothing reads the environment until the first tool
//! that needs a given backend runs (so a Jira-only session does not require
//! Confluence credentials). A missing or empty variable is a fatal
//! configuration error, never a silent default.

use crate::error::{Error, Result};

/// Immutable connection parameters for one backend system.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `https://confluence.example.com`.
    pub base_url: String,
    pub username: String,
    pub api_token: String,
}

impl BackendConfig {
    /// Build a config, validating the base URL and stripping any trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any field is empty or the base URL does not
    /// parse as an absolute `http(s)` URL.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let username = username.into();
        let api_token = api_token.into();

        if base_url.is_empty() || username.is_empty() || api_token.is_empty() {
            return Err(Error::Config(
                "base URL, username and API token must all be non-empty".to_string(),
            ));
        }

        let parsed = url::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid base URL '{base_url}': expected an http(s) URL"
            )));
        }

        Ok(Self {
            base_url,
            username,
            api_token,
        })
    }

    /// Resolve `{prefix}_BASE_URL` / `{prefix}_USERNAME` / `{prefix}_API_TOKEN`
    /// from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first missing variable.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] but with an injectable lookup, so tests do
    /// not have to mutate process-global environment state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first missing variable.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |suffix: &str| -> Result<String> {
            let name = format!("{prefix}_{suffix}");
            match lookup(&name) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(Error::Config(format!(
                    "required environment variable {name} is not set"
                ))),
            }
        };

        Self::new(get("BASE_URL")?, get("USERNAME")?, get("API_TOKEN")?)
    }
}
