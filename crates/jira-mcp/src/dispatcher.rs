//! Tool call dispatch.
//!
//! The [`Dispatcher`] turns a tool name and argument object into a single
//! text result. Each call moves through these states:
//!
//! ```text
//! Received -> Validated -> BackendInvoked -> Rendered
//!                                         -> Failed
//!          -> Rejected
//! ```
//!
//! A call is rejected when the tool name is unknown or the arguments do not
//! match the tool's schema; rejected calls never reach the backend. Errors of
//! every kind are folded into the returned text, so the transport never sees
//! a failure.

use crate::error::{Error, Result};
use crate::format;
use crate::models::{
    AddCommentParams, CreateIssueParams, GetIssueParams, ListProjectsParams, SearchParams,
    TransitionIssueParams, UpdateIssueParams,
};
use crate::registry::ToolName;
use jira_rest::document::encode;
use jira_rest::models::{FieldUpdate, NamedRef, NewIssue, SearchRequest};
use jira_rest::JiraBackend;
use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Terminal state of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend call succeeded and its result was rendered.
    Rendered,
    /// The call was refused before any backend request.
    Rejected,
    /// The backend (or a post-lookup check) failed.
    Failed,
}

/// The text returned for a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Rendered output or error message.
    pub text: String,
    /// How the call ended.
    pub outcome: Outcome,
}

impl ToolResult {
    fn rendered(text: String) -> Self {
        Self {
            text,
            outcome: Outcome::Rendered,
        }
    }

    fn from_error(err: &Error) -> Self {
        let outcome = if err.is_rejection() {
            Outcome::Rejected
        } else {
            Outcome::Failed
        };
        let text = match err {
            Error::UnknownTool(_) => err.to_string(),
            _ => format!("Error: {err}"),
        };
        Self { text, outcome }
    }
}

/// Routes tool calls to the Jira backend and renders the results.
///
/// The dispatcher owns the backend handle for the life of the server.
pub struct Dispatcher {
    backend: Arc<dyn JiraBackend>,
    base_url: String,
}

impl Dispatcher {
    /// Create a dispatcher over `backend`. `base_url` is used to build
    /// browse links for created issues.
    pub fn new(backend: Arc<dyn JiraBackend>, base_url: impl Into<String>) -> Self {
        Self {
            backend,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Handle one tool call. Never fails; errors become `Error: ...` text.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> ToolResult {
        debug!(tool = name, "Received tool call");

        let result = match ToolName::parse(name) {
            Some(tool) => self.execute(tool, arguments.unwrap_or_default()).await,
            None => Err(Error::UnknownTool(name.to_string())),
        };

        match result {
            Ok(text) => {
                debug!(tool = name, "Tool call rendered");
                ToolResult::rendered(text)
            }
            Err(err) => {
                if err.is_rejection() {
                    warn!(tool = name, error = %err, "Tool call rejected");
                } else {
                    error!(tool = name, error = %err, "Error handling tool call");
                }
                ToolResult::from_error(&err)
            }
        }
    }

    async fn execute(&self, tool: ToolName, arguments: JsonObject) -> Result<String> {
        match tool {
            ToolName::Search => self.search(parse_args(tool, arguments)?).await,
            ToolName::GetIssue => self.get_issue(parse_args(tool, arguments)?).await,
            ToolName::CreateIssue => self.create_issue(parse_args(tool, arguments)?).await,
            ToolName::UpdateIssue => self.update_issue(parse_args(tool, arguments)?).await,
            ToolName::AddComment => self.add_comment(parse_args(tool, arguments)?).await,
            ToolName::TransitionIssue => {
                self.transition_issue(parse_args(tool, arguments)?).await
            }
            ToolName::ListProjects => self.list_projects(parse_args(tool, arguments)?).await,
        }
    }

    /// Run a JQL search and render one page.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend search fails.
    pub async fn search(&self, params: SearchParams) -> Result<String> {
        let mut request = SearchRequest::new(params.query.as_str());
        if let Some(max_results) = params.max_results {
            request.max_results = max_results;
        }
        if let Some(start_at) = params.start_at {
            request.start_at = start_at;
        }
        if let Some(fields) = params.fields.filter(|f| !f.is_empty()) {
            request.fields = fields;
        }

        let page = self.backend.search(&request).await?;
        Ok(format::search_results(&params.query, &page))
    }

    /// Fetch and render one issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be fetched.
    pub async fn get_issue(&self, params: GetIssueParams) -> Result<String> {
        let issue = self.backend.get_issue(&params.issue_key, None).await?;
        Ok(format::issue_detail(&issue))
    }

    /// Create an issue and report its key and URL.
    ///
    /// Empty optional strings are treated as absent and left out of the
    /// request.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn create_issue(&self, params: CreateIssueParams) -> Result<String> {
        let new_issue = NewIssue {
            project_key: params.project_key,
            summary: params.summary,
            issue_type: params.issue_type,
            description: non_empty(params.description).as_deref().map(encode),
            priority: non_empty(params.priority),
            assignee: non_empty(params.assignee),
            labels: params.labels.unwrap_or_default(),
            extra_fields: JsonObject::new(),
        };

        let created = self.backend.create_issue(&new_issue).await?;
        Ok(format::created_issue(&self.base_url, &created.key))
    }

    /// Update only the fields present in `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_issue(&self, params: UpdateIssueParams) -> Result<String> {
        let update = FieldUpdate {
            summary: params.summary,
            description: params.description.as_deref().map(encode),
            priority: params.priority.map(|name| NamedRef { name: Some(name) }),
            labels: params.labels,
        };
        if update.is_empty() {
            debug!(key = %params.issue_key, "Update carries no fields");
        }

        self.backend.update_issue(&params.issue_key, &update).await?;
        Ok(format!("Updated issue {}", params.issue_key))
    }

    /// Add a plain-text comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment cannot be added.
    pub async fn add_comment(&self, params: AddCommentParams) -> Result<String> {
        self.backend
            .add_comment(&params.issue_key, &encode(&params.comment))
            .await?;
        Ok(format!("Added comment to {}", params.issue_key))
    }

    /// Look up a transition by name and apply it.
    ///
    /// The lookup and the apply are two requests; if the apply fails after a
    /// successful lookup nothing is rolled back (the lookup is read-only).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransitionNotFound`] listing the available names when
    /// none matches, or a backend error.
    pub async fn transition_issue(&self, params: TransitionIssueParams) -> Result<String> {
        let transitions = self.backend.list_transitions(&params.issue_key).await?;
        let wanted = params.transition_name.to_lowercase();

        let matched = transitions
            .iter()
            .find(|t| t.name.to_lowercase() == wanted)
            .map(|t| t.id.clone());
        let Some(transition_id) = matched else {
            return Err(Error::TransitionNotFound {
                issue_key: params.issue_key,
                name: params.transition_name,
                available: transitions.into_iter().map(|t| t.name).collect(),
            });
        };

        self.backend
            .apply_transition(&params.issue_key, &transition_id)
            .await?;
        Ok(format!(
            "Transitioned {} to {}",
            params.issue_key, params.transition_name
        ))
    }

    /// List accessible projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the project list cannot be fetched.
    pub async fn list_projects(&self, _params: ListProjectsParams) -> Result<String> {
        let projects = self.backend.list_projects().await?;
        Ok(format::project_list(&projects))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Deserialize the argument object for `tool`.
fn parse_args<P: DeserializeOwned>(tool: ToolName, arguments: JsonObject) -> Result<P> {
    serde_json::from_value(Value::Object(arguments)).map_err(|e| Error::InvalidArguments {
        tool: tool.as_str(),
        reason: e.to_string(),
    })
}
