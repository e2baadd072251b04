//! Typed request and response bodies for the Jira REST v3 API.
//!
//! Jira's field bags are large and mostly optional. Each struct below names
//! only the fields this crate reads, and every field Jira may omit (or send
//! as `null`) is an `Option`, so the "not present" branches are explicit at
//! the call sites.

use crate::document::{Node, RichText};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Fields requested by a search when the caller does not override them.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "key",
    "summary",
    "status",
    "assignee",
    "priority",
    "issuetype",
    "created",
    "updated",
];

/// Default page size for searches.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Parameters for an issue search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// JQL query string.
    pub jql: String,
    /// Index of the first result to return.
    pub start_at: u32,
    /// Page size.
    pub max_results: u32,
    /// Field projection.
    pub fields: Vec<String>,
}

impl SearchRequest {
    /// Create a request for the first page with default size and fields.
    #[must_use]
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            start_at: 0,
            max_results: DEFAULT_MAX_RESULTS,
            fields: DEFAULT_SEARCH_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Issues on this page.
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Total number of matches, when Jira reports it.
    pub total: Option<u64>,
    /// Whether this is the last page, when Jira reports it.
    pub is_last: Option<bool>,
}

/// A Jira issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    /// Project-scoped key, e.g. `PROJ-123`.
    pub key: Option<String>,
    /// Requested fields.
    #[serde(default)]
    pub fields: IssueFields,
}

/// The subset of issue fields this crate understands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    /// One-line title.
    pub summary: Option<String>,
    /// Workflow status.
    pub status: Option<NamedRef>,
    /// Issue type (Task, Bug, ...).
    pub issuetype: Option<NamedRef>,
    /// Priority; absent when the project has no priority scheme.
    pub priority: Option<NamedRef>,
    /// Assignee; absent when unassigned.
    pub assignee: Option<User>,
    /// Reporter.
    pub reporter: Option<User>,
    /// Creation timestamp as sent by Jira.
    pub created: Option<String>,
    /// Last update timestamp as sent by Jira.
    pub updated: Option<String>,
    /// Description, document or plain text.
    pub description: Option<RichText>,
    /// Embedded comment page.
    pub comment: Option<CommentPage>,
}

/// Reference to a named entity (status, priority, issue type).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Display name.
    pub name: Option<String>,
}

/// A Jira user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    pub account_id: Option<String>,
    /// Name shown in the UI.
    pub display_name: Option<String>,
    /// Email; hidden by some privacy settings.
    pub email_address: Option<String>,
}

/// Comments embedded in an issue response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPage {
    /// Comments, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A single comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: Option<String>,
    /// Author.
    pub author: Option<User>,
    /// Creation timestamp.
    pub created: Option<String>,
    /// Body, document or plain text.
    pub body: Option<RichText>,
}

/// Response to issue creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    /// Key of the new issue.
    pub key: String,
    /// Numeric id (as a string).
    pub id: String,
    /// REST URL of the new issue.
    #[serde(rename = "self")]
    pub self_url: String,
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    /// Transition identifier used when applying it.
    pub id: String,
    /// Display name, e.g. `In Progress`.
    pub name: String,
}

/// Wrapper returned by the transitions endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransitionList {
    #[serde(default)]
    pub(crate) transitions: Vec<Transition>,
}

/// A project visible to the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project key, e.g. `PROJ`.
    pub key: Option<String>,
    /// Project name.
    pub name: Option<String>,
    /// Project type, e.g. `software`.
    pub project_type_key: Option<String>,
}

/// The authenticated account, as returned by `/myself`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// Account identifier.
    pub account_id: Option<String>,
    /// Name shown in the UI.
    pub display_name: Option<String>,
    /// Email address.
    pub email_address: Option<String>,
}

/// Fields for a new issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    /// Project key.
    pub project_key: String,
    /// Summary line.
    pub summary: String,
    /// Issue type name.
    pub issue_type: String,
    /// Description document.
    pub description: Option<Node>,
    /// Priority name.
    pub priority: Option<String>,
    /// Assignee account id.
    pub assignee: Option<String>,
    /// Labels.
    pub labels: Vec<String>,
    /// Additional raw fields (custom fields), merged last.
    pub extra_fields: Map<String, Value>,
}

impl NewIssue {
    /// Build the `{"fields": {...}}` request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the description cannot be serialized.
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        let mut fields = Map::new();
        fields.insert("project".into(), json!({ "key": self.project_key }));
        fields.insert("summary".into(), json!(self.summary));
        fields.insert("issuetype".into(), json!({ "name": self.issue_type }));

        if let Some(description) = &self.description {
            fields.insert("description".into(), serde_json::to_value(description)?);
        }
        if let Some(priority) = &self.priority {
            fields.insert("priority".into(), json!({ "name": priority }));
        }
        if let Some(assignee) = &self.assignee {
            fields.insert("assignee".into(), json!({ "accountId": assignee }));
        }
        if !self.labels.is_empty() {
            fields.insert("labels".into(), json!(self.labels));
        }
        for (key, value) in &self.extra_fields {
            fields.insert(key.clone(), value.clone());
        }

        Ok(json!({ "fields": fields }))
    }
}

/// A partial field update. Only `Some` fields are sent; the rest stay as
/// they are on the issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldUpdate {
    /// New summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// New description document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Node>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NamedRef>,
    /// Replacement label set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl FieldUpdate {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.labels.is_none()
    }
}

/// Error body returned by Jira on failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) error_messages: Vec<String>,
    #[serde(default)]
    pub(crate) errors: std::collections::BTreeMap<String, Value>,
}

impl ErrorBody {
    /// Flatten into a single detail line, or `None` if the body said nothing.
    pub(crate) fn detail(&self) -> Option<String> {
        if !self.error_messages.is_empty() {
            return Some(self.error_messages.join("; "));
        }
        if !self.errors.is_empty() {
            let parts: Vec<String> = self
                .errors
                .iter()
                .map(|(field, message)| match message {
                    Value::String(s) => format!("{field}: {s}"),
                    other => format!("{field}: {other}"),
                })
                .collect();
            return Some(parts.join("; "));
        }
        None
    }
}
