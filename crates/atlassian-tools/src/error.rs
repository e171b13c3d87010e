//! Error taxonomy shared by config, clients and tool dispatch.
//!
//! Policy: lower layers never swallow errors. The clients produce `Http` /
//! `Transport`, dispatch refines status-specific cases (`NotFound`, `Auth`)
//! and wraps everything in `Operation` so the caller sees which tool failed
//! without re-running with verbose logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty connection parameters. Fatal, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad caller arguments. The backend is never contacted.
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// Upstream 404 for a specific identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream 401/403.
    #[error("authentication rejected by backend: {0}")]
    Auth(String),

    /// Any other non-2xx response, body preserved for diagnostics.
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection refused, timeout, TLS failure and friends.
    #[error("transport error: {0}")]
    Transport(String),

    /// A tool invocation failed; wraps the underlying error with the tool name.
    #[error("{operation} failed: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

impl Error {
    /// Refine an upstream 404 into `NotFound` naming the entity the caller
    /// asked for. Other errors pass through unchanged.
    #[must_use]
    pub fn not_found_context(self, what: impl Into<String>) -> Self {
        match self {
            Self::Http { status: 404, body } => Self::NotFound(format!("{}: {body}", what.into())),
            other => other,
        }
    }

    /// Wrap this error for a named tool invocation, refining auth rejections
    /// along the way.
    #[must_use]
    pub fn for_operation(self, operation: &str) -> Self {
        let source = match self {
            Self::Http {
                status: status @ (401 | 403),
                body,
            } => Self::Auth(format!("HTTP {status}: {body}")),
            other => other,
        };
        Self::Operation {
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }

    /// True for errors raised before any backend call was attempted.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Render a reqwest error with credentials/query stripped from any embedded URL.
fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

fn redact_url(url: &url::Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}
