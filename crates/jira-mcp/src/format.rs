//! Plain-text rendering of Jira responses.
//!
//! All functions here are pure: the same response and arguments always
//! produce the same text.

use jira_rest::document::decode;
use jira_rest::models::{Comment, Issue, NamedRef, Project, SearchResults, User};

/// Number of trailing comments shown by [`issue_detail`].
pub const MAX_COMMENTS: usize = 5;

/// Maximum characters of each comment body shown by [`issue_detail`].
pub const COMMENT_PREVIEW_CHARS: usize = 200;

const UNKNOWN: &str = "Unknown";
const UNASSIGNED: &str = "Unassigned";
const NO_PRIORITY: &str = "None";
const NO_SUMMARY: &str = "No summary";
const NO_KEY: &str = "N/A";

fn name_or<'a>(field: Option<&'a NamedRef>, default: &'a str) -> &'a str {
    field.and_then(|r| r.name.as_deref()).unwrap_or(default)
}

fn display_name(user: &User) -> &str {
    user.display_name.as_deref().unwrap_or(UNKNOWN)
}

/// Compact two-line summary of an issue.
#[must_use]
pub fn issue_summary(issue: &Issue) -> String {
    let fields = &issue.fields;
    let assignee = fields
        .assignee
        .as_ref()
        .and_then(|user| user.display_name.as_deref())
        .unwrap_or(UNASSIGNED);

    format!(
        "[{}] {}\n  Type: {} | Status: {} | Priority: {} | Assignee: {}",
        issue.key.as_deref().unwrap_or(NO_KEY),
        fields.summary.as_deref().unwrap_or(NO_SUMMARY),
        name_or(fields.issuetype.as_ref(), UNKNOWN),
        name_or(fields.status.as_ref(), UNKNOWN),
        name_or(fields.priority.as_ref(), NO_PRIORITY),
        assignee,
    )
}

/// Render one page of search results.
#[must_use]
pub fn search_results(query: &str, page: &SearchResults) -> String {
    let shown = page.issues.len();
    if shown == 0 {
        return format!("No issues found matching: {query}");
    }

    let total = page.total.and_then(|t| usize::try_from(t).ok());
    let header = match total {
        Some(total) if total > 0 && total != shown => {
            format!("Found {total} total issue(s) (showing {shown}):\n")
        }
        _ if page.is_last == Some(false) => format!("Showing {shown} issue(s) (more available):\n"),
        _ => format!("Found {shown} issue(s):\n"),
    };

    let mut lines = vec![header];
    for issue in &page.issues {
        lines.push(issue_summary(issue));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Full multi-line view of an issue, with the most recent comments.
#[must_use]
pub fn issue_detail(issue: &Issue) -> String {
    let fields = &issue.fields;
    let mut lines = vec![
        format!("Issue: {}", issue.key.as_deref().unwrap_or(NO_KEY)),
        format!(
            "Summary: {}",
            fields.summary.as_deref().unwrap_or(NO_SUMMARY)
        ),
        format!("Type: {}", name_or(fields.issuetype.as_ref(), UNKNOWN)),
        format!("Status: {}", name_or(fields.status.as_ref(), UNKNOWN)),
        format!("Priority: {}", name_or(fields.priority.as_ref(), NO_PRIORITY)),
    ];

    match &fields.assignee {
        Some(user) => lines.push(format!(
            "Assignee: {} ({})",
            display_name(user),
            user.email_address.as_deref().unwrap_or_default()
        )),
        None => lines.push(format!("Assignee: {UNASSIGNED}")),
    }

    if let Some(reporter) = &fields.reporter {
        lines.push(format!("Reporter: {}", display_name(reporter)));
    }
    if let Some(created) = &fields.created {
        lines.push(format!("Created: {created}"));
    }
    if let Some(updated) = &fields.updated {
        lines.push(format!("Updated: {updated}"));
    }

    if let Some(description) = &fields.description {
        lines.push(format!("\nDescription:\n{}", decode(description)));
    }

    let comments = fields
        .comment
        .as_ref()
        .map(|page| page.comments.as_slice())
        .unwrap_or_default();
    if !comments.is_empty() {
        lines.push(format!("\nComments ({}):", comments.len()));
        let recent = &comments[comments.len().saturating_sub(MAX_COMMENTS)..];
        for comment in recent {
            lines.extend(comment_preview(comment));
        }
    }

    lines.join("\n")
}

/// Header and truncated body lines for one comment.
fn comment_preview(comment: &Comment) -> [String; 2] {
    let author = comment.author.as_ref().map_or(UNKNOWN, display_name);
    let created = comment.created.as_deref().unwrap_or_default();
    let body = comment.body.as_ref().map(decode).unwrap_or_default();
    let preview: String = body.chars().take(COMMENT_PREVIEW_CHARS).collect();

    [
        format!("  [{author} @ {created}]"),
        format!("  {preview}..."),
    ]
}

/// Confirmation for a newly created issue, with its browse URL.
#[must_use]
pub fn created_issue(base_url: &str, key: &str) -> String {
    format!("Created issue {key}\nURL: {base_url}/browse/{key}")
}

/// Render the project list, preserving backend order.
#[must_use]
pub fn project_list(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found".to_string();
    }

    let mut lines = vec![format!("Found {} project(s):\n", projects.len())];
    lines.extend(projects.iter().map(|project| {
        format!(
            "[{}] {} ({})",
            project.key.as_deref().unwrap_or(NO_KEY),
            project.name.as_deref().unwrap_or(UNKNOWN),
            project.project_type_key.as_deref().unwrap_or("unknown"),
        )
    }));
    lines.join("\n")
}
