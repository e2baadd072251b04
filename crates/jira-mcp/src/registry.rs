//! The fixed catalog of tools advertised to MCP clients.
//!
//! The catalog is built once, on first use, and never changes afterwards.
//! Argument schemas come from the parameter structs in [`crate::models`].

use crate::models::{
    AddCommentParams, CreateIssueParams, GetIssueParams, ListProjectsParams, SearchParams,
    TransitionIssueParams, UpdateIssueParams,
};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Names of the tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// JQL search.
    Search,
    /// Issue details.
    GetIssue,
    /// Issue creation.
    CreateIssue,
    /// Partial issue update.
    UpdateIssue,
    /// New comment.
    AddComment,
    /// Workflow transition.
    TransitionIssue,
    /// Project listing.
    ListProjects,
}

impl ToolName {
    /// Every tool, in advertised order.
    pub const ALL: [ToolName; 7] = [
        Self::Search,
        Self::GetIssue,
        Self::CreateIssue,
        Self::UpdateIssue,
        Self::AddComment,
        Self::TransitionIssue,
        Self::ListProjects,
    ];

    /// Wire name of the tool.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::GetIssue => "get_issue",
            Self::CreateIssue => "create_issue",
            Self::UpdateIssue => "update_issue",
            Self::AddComment => "add_comment",
            Self::TransitionIssue => "transition_issue",
            Self::ListProjects => "list_projects",
        }
    }

    /// Look up a tool by wire name. Matching is exact.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool as advertised to clients.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: ToolName,
    /// Natural-language description shown to the model.
    pub description: &'static str,
    /// JSON Schema of the argument object.
    pub schema: Arc<JsonObject>,
}

impl ToolDefinition {
    fn new<P: JsonSchema>(name: ToolName, description: &'static str) -> Self {
        Self {
            name,
            description,
            schema: Arc::new(schema_for::<P>()),
        }
    }

    /// Convert into the rmcp wire type.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name.as_str(), self.description, Arc::clone(&self.schema))
    }
}

/// Derive the argument schema of `P` as a JSON object.
fn schema_for<P: JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(P);
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(mut object)) => {
            // Clients only need the argument shape.
            object.remove("$schema");
            object.remove("title");
            object
        }
        _ => JsonObject::new(),
    }
}

static DEFINITIONS: LazyLock<Vec<ToolDefinition>> = LazyLock::new(|| {
    vec![
        ToolDefinition::new::<SearchParams>(
            ToolName::Search,
            "Search for Jira issues using JQL (Jira Query Language). \
             Returns a list of matching issues with key details. \
             Examples: 'assignee = currentUser()', 'project = PROJ AND status = \"In Progress\"'. \
             Use start_at to fetch later pages.",
        ),
        ToolDefinition::new::<GetIssueParams>(
            ToolName::GetIssue,
            "Get detailed information about a specific Jira issue by its key (e.g., 'PROJ-123'), \
             including description and the most recent comments.",
        ),
        ToolDefinition::new::<CreateIssueParams>(
            ToolName::CreateIssue,
            "Create a new Jira issue. Returns the created issue key and URL. \
             Common issue types: Task, Bug, Story, Epic. \
             Common priorities: Highest, High, Medium, Low, Lowest.",
        ),
        ToolDefinition::new::<UpdateIssueParams>(
            ToolName::UpdateIssue,
            "Update fields on an existing Jira issue. Only the fields provided are changed.",
        ),
        ToolDefinition::new::<AddCommentParams>(
            ToolName::AddComment,
            "Add a comment to a Jira issue.",
        ),
        ToolDefinition::new::<TransitionIssueParams>(
            ToolName::TransitionIssue,
            "Transition a Jira issue to a new status. \
             Common transitions: 'To Do', 'In Progress', 'Done', 'Blocked'. \
             Available transitions depend on the project workflow.",
        ),
        ToolDefinition::new::<ListProjectsParams>(
            ToolName::ListProjects,
            "List all Jira projects accessible to the authenticated user.",
        ),
    ]
});

/// All tool definitions, in advertised order.
#[must_use]
pub fn definitions() -> &'static [ToolDefinition] {
    &DEFINITIONS
}

/// Find the definition for `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ToolDefinition> {
    let tool = ToolName::parse(name)?;
    definitions().iter().find(|def| def.name == tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn required(def: &ToolDefinition) -> Vec<String> {
        let mut names: Vec<String> = def
            .schema
            .get("required")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn test_definitions_order_is_stable() {
        let names: Vec<&str> = definitions().iter().map(|d| d.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "search",
                "get_issue",
                "create_issue",
                "update_issue",
                "add_comment",
                "transition_issue",
                "list_projects",
            ]
        );
    }

    #[test]
    fn test_every_tool_has_definition() {
        for tool in ToolName::ALL {
            let def = lookup(tool.as_str()).expect("tool should be registered");
            assert_eq!(def.name, tool);
            assert!(!def.description.is_empty());
            assert_eq!(def.schema.get("type"), Some(&Value::from("object")));
        }
    }

    #[rstest]
    #[case::search(ToolName::Search, &["query"])]
    #[case::get_issue(ToolName::GetIssue, &["issue_key"])]
    #[case::create_issue(ToolName::CreateIssue, &["issue_type", "project_key", "summary"])]
    #[case::update_issue(ToolName::UpdateIssue, &["issue_key"])]
    #[case::add_comment(ToolName::AddComment, &["comment", "issue_key"])]
    #[case::transition_issue(ToolName::TransitionIssue, &["issue_key", "transition_name"])]
    #[case::list_projects(ToolName::ListProjects, &[])]
    fn test_required_arguments(#[case] tool: ToolName, #[case] expected: &[&str]) {
        let def = lookup(tool.as_str()).unwrap();
        assert_eq!(required(def), expected);
    }

    #[test]
    fn test_labels_schema_is_string_array() {
        let def = lookup("create_issue").unwrap();
        let labels = &def.schema["properties"]["labels"];

        assert_eq!(labels["items"]["type"], Value::from("string"));
    }

    #[rstest]
    #[case::unknown("jira_delete_issue")]
    #[case::case_sensitive("Search")]
    #[case::empty("")]
    fn test_lookup_unknown(#[case] name: &str) {
        assert!(ToolName::parse(name).is_none());
        assert!(lookup(name).is_none());
    }

    #[test]
    fn test_to_tool_carries_schema() {
        let tool = lookup("add_comment").unwrap().to_tool();

        assert_eq!(tool.name, "add_comment");
        assert!(tool.input_schema.contains_key("properties"));
    }
}
