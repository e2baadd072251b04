//! MCP tool parameter models.
//!
//! Each struct is the argument object of one tool. Its JSON Schema (derived
//! through `schemars`) is what the registry advertises, and the same struct
//! is what incoming arguments are deserialized into, so the two cannot drift.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the `search` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// JQL query string, e.g. `project = PROJ AND status = "In Progress"`.
    pub query: String,

    /// Maximum number of results to return (default: 50).
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Index of the first result, for fetching later pages (default: 0).
    #[serde(default)]
    pub start_at: Option<u32>,

    /// Fields to request instead of the default projection.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

/// Parameters for the `get_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// Issue key (e.g. `PROJ-123`).
    pub issue_key: String,
}

/// Parameters for the `create_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key (e.g. `PROJ`).
    pub project_key: String,

    /// Issue summary/title.
    pub summary: String,

    /// Issue type (e.g. `Task`, `Bug`, `Story`).
    pub issue_type: String,

    /// Issue description as plain text.
    #[serde(default)]
    pub description: Option<String>,

    /// Priority name (e.g. `High`, `Medium`, `Low`).
    #[serde(default)]
    pub priority: Option<String>,

    /// Labels to attach.
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    /// Account id of the assignee.
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Parameters for the `update_issue` tool.
///
/// Omitted fields are left untouched on the issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// Issue key (e.g. `PROJ-123`).
    pub issue_key: String,

    /// New summary/title.
    #[serde(default)]
    pub summary: Option<String>,

    /// New description as plain text.
    #[serde(default)]
    pub description: Option<String>,

    /// New priority name.
    #[serde(default)]
    pub priority: Option<String>,

    /// Replacement label list.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Parameters for the `add_comment` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Issue key (e.g. `PROJ-123`).
    pub issue_key: String,

    /// Comment text.
    pub comment: String,
}

/// Parameters for the `transition_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TransitionIssueParams {
    /// Issue key (e.g. `PROJ-123`).
    pub issue_key: String,

    /// Name of the transition (e.g. `Done`, `In Progress`), matched case-insensitively.
    pub transition_name: String,
}

/// Parameters for the `list_projects` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProjectsParams {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_params_defaults() {
        let params: SearchParams = serde_json::from_value(json!({"query": "project = X"})).unwrap();

        assert_eq!(params.query, "project = X");
        assert!(params.max_results.is_none());
        assert!(params.start_at.is_none());
        assert!(params.fields.is_none());
    }

    #[test]
    fn test_update_params_null_is_absent() {
        let params: UpdateIssueParams =
            serde_json::from_value(json!({"issue_key": "PROJ-1", "summary": null})).unwrap();

        assert!(params.summary.is_none());
    }

    #[test]
    fn test_mistyped_argument_rejected() {
        let result: Result<SearchParams, _> =
            serde_json::from_value(json!({"query": "x", "max_results": "ten"}));

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_argument_rejected() {
        let err = serde_json::from_value::<AddCommentParams>(json!({"issue_key": "PROJ-1"}))
            .unwrap_err();

        assert!(err.to_string().contains("missing field `comment`"));
    }
}
