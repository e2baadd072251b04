//! Error types for Jira REST operations.

use thiserror::Error;

/// The error type for Jira REST operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Jira answered with a non-success status code.
    #[error("Jira API error ({status}): {detail}")]
    Api {
        /// HTTP status code returned by Jira.
        status: u16,
        /// Human-readable detail extracted from the response body.
        detail: String,
    },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No instance name was given on the command line or in `JIRA_INSTANCE`.
    #[error(
        "No instance specified. Provide --instance argument or set JIRA_INSTANCE environment variable"
    )]
    NoInstance,

    /// A required environment variable is unset or empty.
    #[error("Missing {0} environment variable")]
    MissingEnv(String),

    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid Jira URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl Error {
    /// HTTP status code for API errors, `None` for every other kind.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized Result type for Jira REST operations.
pub type Result<T> = std::result::Result<T, Error>;
