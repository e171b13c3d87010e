//! Shared HTTP execution for the backend clients.
//!
//! Both backends speak the same dialect: HTTP Basic auth with username + API
//! token, JSON in and out, and a fixed REST prefix under the base URL. The
//! URL join lives in exactly one place ([`Transport::url`]) so separators can
//! never be doubled or dropped.

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Upper bound on error-body text carried inside an [`Error::Http`].
const MAX_ERROR_BODY_CHARS: usize = 2048;

/// One authenticated connection context for one backend system.
///
/// `reqwest::Client` pools connections internally and is safe to use from
/// concurrent tool invocations sharing the one instance.
pub(crate) struct Transport {
    http: Client,
    base_url: String,
    api_prefix: &'static str,
    username: String,
    api_token: String,
}

impl Transport {
    pub(crate) fn new(
        config: BackendConfig,
        api_prefix: &'static str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_prefix,
            username: config.username,
            api_token: config.api_token,
        })
    }

    /// The single join point: `base_url + api_prefix + path`.
    ///
    /// `base_url` carries no trailing slash (enforced by [`BackendConfig`]) and
    /// every `path` starts with one.
    fn url(&self, path: &str) -> String {
        debug_assert!(path.starts_with('/'), "relative path must start with '/'");
        format!("{}{}{path}", self.base_url, self.api_prefix)
    }

    /// Start an authenticated request for `path` under the REST prefix.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "backend request");
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a prepared request and surface the response as JSON.
    ///
    /// An empty 2xx body (deletes answer 202/204) parses as `Value::Null`;
    /// non-JSON success bodies are kept as a JSON string. Any non-2xx status
    /// becomes [`Error::Http`] with the body preserved for diagnostics.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        } else {
            Err(Error::Http {
                status: status.as_u16(),
                body: truncate_body(&text),
            })
        }
    }
}

fn truncate_body(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("{cut}… (truncated)")
}
