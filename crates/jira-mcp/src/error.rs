//! Error types for the Jira MCP server.

use thiserror::Error;

/// Errors that can occur while handling a tool call.
#[derive(Debug, Error)]
pub enum Error {
    /// No tool is registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments were missing or had the wrong type.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// The tool being called.
        tool: &'static str,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// The requested transition is not available on the issue.
    #[error(
        "Transition '{name}' not found for {issue_key}. Available transitions: {}",
        available.join(", ")
    )]
    TransitionNotFound {
        /// Issue the transition was requested for.
        issue_key: String,
        /// Name that did not match.
        name: String,
        /// Names that would have matched.
        available: Vec<String>,
    },

    /// An error reported by Jira or the HTTP layer.
    #[error(transparent)]
    Backend(#[from] jira_rest::Error),

    /// MCP protocol error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

impl Error {
    /// Whether the call was rejected before reaching the backend.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::InvalidArguments { .. })
    }
}

/// Result type for Jira MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
