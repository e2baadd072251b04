//! Backend abstraction over the Jira REST API.
//!
//! [`JiraBackend`] is the seam between tool handling and HTTP. The production
//! implementation is [`crate::client::JiraClient`]; tests substitute
//! [`MockBackend`].
//!
//! # Test Utilities
//!
//! [`MockBackend`] is available under `#[cfg(test)]` and with the `test-util`
//! feature:
//!
//! ```toml
//! [dev-dependencies]
//! jira-rest = { version = "...", features = ["test-util"] }
//! ```

use crate::document::Node;
use crate::error::Result;
use crate::models::{
    Comment, CreatedIssue, CurrentUser, FieldUpdate, Issue, NewIssue, Project, SearchRequest,
    SearchResults, Transition,
};
use async_trait::async_trait;

/// Operations a Jira backend must provide.
///
/// Every method fails with [`crate::Error::Api`] when Jira answers with a
/// non-success status.
#[async_trait]
pub trait JiraBackend: Send + Sync {
    /// Return the authenticated account.
    async fn myself(&self) -> Result<CurrentUser>;

    /// Run a JQL search and return one page of results.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Fetch one issue. `fields` limits the projection; `None` returns all.
    async fn get_issue(&self, key: &str, fields: Option<&[String]>) -> Result<Issue>;

    /// Create an issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue>;

    /// Apply a partial field update.
    async fn update_issue(&self, key: &str, fields: &FieldUpdate) -> Result<()>;

    /// Add a comment with a document body.
    async fn add_comment(&self, key: &str, body: &Node) -> Result<Comment>;

    /// List transitions currently available on an issue.
    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>>;

    /// Apply a transition by id.
    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<()>;

    /// List projects visible to the authenticated account.
    async fn list_projects(&self) -> Result<Vec<Project>>;
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::{BackendCall, MockBackend};

#[cfg(any(test, feature = "test-util"))]
mod mock {
    use super::{JiraBackend, Result};
    use crate::document::Node;
    use crate::error::Error;
    use crate::models::{
        Comment, CreatedIssue, CurrentUser, FieldUpdate, Issue, NewIssue, Project,
        SearchRequest, SearchResults, Transition,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// A backend call recorded by [`MockBackend`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendCall {
        /// `myself`
        Myself,
        /// `search`
        Search(SearchRequest),
        /// `get_issue`
        GetIssue(String),
        /// `create_issue`
        CreateIssue(NewIssue),
        /// `update_issue`
        UpdateIssue {
            /// Issue key.
            key: String,
            /// Fields sent.
            fields: FieldUpdate,
        },
        /// `add_comment`
        AddComment {
            /// Issue key.
            key: String,
            /// Comment body.
            body: Node,
        },
        /// `list_transitions`
        ListTransitions(String),
        /// `apply_transition`
        ApplyTransition {
            /// Issue key.
            key: String,
            /// Transition id.
            transition_id: String,
        },
        /// `list_projects`
        ListProjects,
    }

    impl BackendCall {
        /// Whether this call changes data on the backend.
        #[must_use]
        pub fn is_mutation(&self) -> bool {
            matches!(
                self,
                Self::CreateIssue(_)
                    | Self::UpdateIssue { .. }
                    | Self::AddComment { .. }
                    | Self::ApplyTransition { .. }
            )
        }
    }

    #[derive(Default)]
    struct MockState {
        search: SearchResults,
        issues: HashMap<String, Issue>,
        transitions: Vec<Transition>,
        projects: Vec<Project>,
        failure: Option<(u16, String)>,
        calls: Vec<BackendCall>,
    }

    /// In-memory [`JiraBackend`] with canned responses and a call log.
    ///
    /// # Behavior
    ///
    /// - `search`: returns the configured page (empty by default)
    /// - `get_issue`: returns a configured issue, or a 404 API error
    /// - `create_issue`: returns key `{project}-1`
    /// - `list_transitions`, `list_projects`: return the configured lists
    /// - mutations succeed and are only recorded
    /// - with [`MockBackend::failing_with`], every call returns that API error
    ///
    /// Every call is recorded, including failing ones.
    #[derive(Default)]
    pub struct MockBackend {
        state: Mutex<MockState>,
    }

    impl MockBackend {
        /// Create an empty mock.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `results` for every search.
        #[must_use]
        pub fn with_search_results(self, results: SearchResults) -> Self {
            self.lock().search = results;
            self
        }

        /// Serve `issue` for `get_issue` on its key.
        #[must_use]
        pub fn with_issue(self, issue: Issue) -> Self {
            let key = issue.key.clone().unwrap_or_default();
            self.lock().issues.insert(key, issue);
            self
        }

        /// Serve `transitions` for every issue.
        #[must_use]
        pub fn with_transitions(self, transitions: Vec<Transition>) -> Self {
            self.lock().transitions = transitions;
            self
        }

        /// Serve `projects` from `list_projects`.
        #[must_use]
        pub fn with_projects(self, projects: Vec<Project>) -> Self {
            self.lock().projects = projects;
            self
        }

        /// Fail every call with the given status and detail.
        #[must_use]
        pub fn failing_with(self, status: u16, detail: impl Into<String>) -> Self {
            self.lock().failure = Some((status, detail.into()));
            self
        }

        /// Calls received so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<BackendCall> {
            self.lock().calls.clone()
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Record `call` and return the configured failure, if any.
        fn record(&self, call: BackendCall) -> Result<()> {
            let mut state = self.lock();
            state.calls.push(call);
            match state.failure.clone() {
                Some((status, detail)) => Err(Error::Api { status, detail }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl JiraBackend for MockBackend {
        async fn myself(&self) -> Result<CurrentUser> {
            self.record(BackendCall::Myself)?;
            Ok(CurrentUser {
                account_id: Some("mock-account".into()),
                display_name: Some("Mock User".into()),
                email_address: Some("mock@example.com".into()),
            })
        }

        async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
            self.record(BackendCall::Search(request.clone()))?;
            Ok(self.lock().search.clone())
        }

        async fn get_issue(&self, key: &str, _fields: Option<&[String]>) -> Result<Issue> {
            self.record(BackendCall::GetIssue(key.to_string()))?;
            self.lock().issues.get(key).cloned().ok_or_else(|| Error::Api {
                status: 404,
                detail: "Issue does not exist or you do not have permission to see it."
                    .to_string(),
            })
        }

        async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
            self.record(BackendCall::CreateIssue(issue.clone()))?;
            let key = format!("{}-1", issue.project_key);
            Ok(CreatedIssue {
                self_url: format!("https://mock.invalid/rest/api/3/issue/{key}"),
                id: "10001".to_string(),
                key,
            })
        }

        async fn update_issue(&self, key: &str, fields: &FieldUpdate) -> Result<()> {
            self.record(BackendCall::UpdateIssue {
                key: key.to_string(),
                fields: fields.clone(),
            })?;
            Ok(())
        }

        async fn add_comment(&self, key: &str, body: &Node) -> Result<Comment> {
            self.record(BackendCall::AddComment {
                key: key.to_string(),
                body: body.clone(),
            })?;
            Ok(Comment {
                id: Some("20001".to_string()),
                body: Some(body.clone().into()),
                ..Default::default()
            })
        }

        async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>> {
            self.record(BackendCall::ListTransitions(key.to_string()))?;
            Ok(self.lock().transitions.clone())
        }

        async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<()> {
            self.record(BackendCall::ApplyTransition {
                key: key.to_string(),
                transition_id: transition_id.to_string(),
            })?;
            Ok(())
        }

        async fn list_projects(&self) -> Result<Vec<Project>> {
            self.record(BackendCall::ListProjects)?;
            Ok(self.lock().projects.clone())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::document::encode;

        #[tokio::test]
        async fn test_mock_records_calls_in_order() {
            let backend = MockBackend::new();

            backend.list_projects().await.unwrap();
            backend.add_comment("PROJ-1", &encode("hi")).await.unwrap();

            let calls = backend.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0], BackendCall::ListProjects);
            assert!(calls[1].is_mutation());
        }

        #[tokio::test]
        async fn test_mock_unknown_issue_is_404() {
            let backend = MockBackend::new();

            let err = backend.get_issue("NOPE-1", None).await.unwrap_err();
            assert_eq!(err.status(), Some(404));
        }

        #[tokio::test]
        async fn test_mock_failed_mutation_is_recorded_not_applied() {
            let backend = MockBackend::new().failing_with(409, "Conflict");

            let err = backend.apply_transition("PROJ-1", "31").await.unwrap_err();
            assert_eq!(err.status(), Some(409));
            assert!(backend.calls()[0].is_mutation());

            let ok = MockBackend::new();
            ok.update_issue("PROJ-1", &FieldUpdate::default()).await.unwrap();
            assert_eq!(ok.calls().len(), 1);
        }

        #[tokio::test]
        async fn test_mock_failure_applies_to_every_call() {
            let backend = MockBackend::new().failing_with(503, "Service unavailable");

            let err = backend.list_transitions("PROJ-1").await.unwrap_err();
            assert_eq!(err.to_string(), "Jira API error (503): Service unavailable");
            assert_eq!(
                backend.calls(),
                vec![BackendCall::ListTransitions("PROJ-1".into())]
            );
        }
    }
}
