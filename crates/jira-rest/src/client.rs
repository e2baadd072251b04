//! HTTP implementation of [`JiraBackend`] for Jira Cloud REST v3.

use crate::backend::JiraBackend;
use crate::config::InstanceConfig;
use crate::document::Node;
use crate::error::{Error, Result};
use crate::models::{
    Comment, CreatedIssue, CurrentUser, ErrorBody, FieldUpdate, Issue, NewIssue, Project,
    SearchRequest, SearchResults, Transition, TransitionList,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the REST API below the instance base URL.
const API_PATH: &str = "/rest/api/3";

/// Jira REST client authenticated with an email and API token.
///
/// One client is created at startup and shared for the life of the process.
/// The underlying connection pool is released when the client is dropped.
pub struct JiraClient {
    http: Client,
    instance_name: String,
    base_url: String,
    email: String,
    api_token: SecretString,
}

impl JiraClient {
    /// Create a client for the configured instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: InstanceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        info!(
            instance = %config.instance_name,
            url = %config.base_url,
            "Initialized Jira client"
        );

        Ok(Self {
            http,
            instance_name: config.instance_name,
            base_url: config.base_url,
            email: config.email,
            api_token: config.api_token,
        })
    }

    /// Instance base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PATH}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .basic_auth(&self.email, Some(self.api_token.expose_secret()))
    }

    /// Send a request and return the raw body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            let error = api_error(status.as_u16(), &body);
            warn!(%error, "Jira request failed");
            Err(error)
        }
    }

    /// Send a request and decode the JSON response.
    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.execute(builder).await?;
        let body = if body.trim().is_empty() { "{}" } else { &body };
        Ok(parse_json(body)?)
    }
}

/// Parse a response body without serde_json's nesting limit.
///
/// Each document level costs two levels of JSON nesting, so nested lists in a
/// description quickly pass the default limit of 128. The stack grows on the
/// heap as needed instead.
///
/// # Errors
///
/// Returns an error if `body` is not valid JSON for `T`.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Build an API error from a failed response body.
///
/// Uses Jira's `errorMessages`, then its per-field `errors`, then the raw
/// body text.
fn api_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail())
        .unwrap_or_else(|| body.trim().to_string());
    Error::Api { status, detail }
}

#[async_trait]
impl JiraBackend for JiraClient {
    async fn myself(&self) -> Result<CurrentUser> {
        info!(instance = %self.instance_name, "Testing connection");
        let user: CurrentUser = self.fetch(self.request(Method::GET, "/myself")).await?;
        info!(email = ?user.email_address, "Connected successfully");
        Ok(user)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        info!(jql = %request.jql, "Searching issues");
        let start_at = request.start_at.to_string();
        let max_results = request.max_results.to_string();
        let fields = request.fields.join(",");

        let builder = self.request(Method::GET, "/search/jql").query(&[
            ("jql", request.jql.as_str()),
            ("startAt", start_at.as_str()),
            ("maxResults", max_results.as_str()),
            ("fields", fields.as_str()),
        ]);
        self.fetch(builder).await
    }

    async fn get_issue(&self, key: &str, fields: Option<&[String]>) -> Result<Issue> {
        info!(key, "Getting issue");
        let mut builder = self.request(Method::GET, &format!("/issue/{key}"));
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            builder = builder.query(&[("fields", fields.join(","))]);
        }
        self.fetch(builder).await
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        info!(project = %issue.project_key, summary = %issue.summary, "Creating issue");
        let payload = issue.to_payload()?;
        self.fetch(self.request(Method::POST, "/issue").json(&payload))
            .await
    }

    async fn update_issue(&self, key: &str, fields: &FieldUpdate) -> Result<()> {
        info!(key, "Updating issue");
        let payload = json!({ "fields": fields });
        self.execute(self.request(Method::PUT, &format!("/issue/{key}")).json(&payload))
            .await?;
        Ok(())
    }

    async fn add_comment(&self, key: &str, body: &Node) -> Result<Comment> {
        info!(key, "Adding comment");
        let payload = json!({ "body": body });
        self.fetch(
            self.request(Method::POST, &format!("/issue/{key}/comment"))
                .json(&payload),
        )
        .await
    }

    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        info!(key, "Getting available transitions");
        let list: TransitionList = self
            .fetch(self.request(Method::GET, &format!("/issue/{key}/transitions")))
            .await?;
        debug!(key, count = list.transitions.len(), "Fetched transitions");
        Ok(list.transitions)
    }

    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<()> {
        info!(key, transition_id, "Transitioning issue");
        let payload = json!({ "transition": { "id": transition_id } });
        self.execute(
            self.request(Method::POST, &format!("/issue/{key}/transitions"))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        info!("Listing all projects");
        self.fetch(self.request(Method::GET, "/project")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client() -> JiraClient {
        let lookup = |key: &str| match key {
            "JIRA_ACME_URL" => Some("https://acme.atlassian.net/".to_string()),
            "JIRA_ACME_EMAIL" => Some("dev@acme.test".to_string()),
            "JIRA_ACME_TOKEN" => Some("token".to_string()),
            _ => None,
        };
        let config = InstanceConfig::from_lookup("acme", lookup).unwrap();
        JiraClient::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_api_path() {
        let client = client();

        assert_eq!(client.base_url(), "https://acme.atlassian.net");
        assert_eq!(
            client.endpoint("/issue/PROJ-1"),
            "https://acme.atlassian.net/rest/api/3/issue/PROJ-1"
        );
    }

    fn nested_issue_body(depth: usize) -> String {
        let mut description = r#"{"type":"text","text":"buried"}"#.to_string();
        for _ in 0..depth {
            description = format!(r#"{{"type":"blockquote","content":[{description}]}}"#);
        }
        format!(
            r#"{{"key":"PROJ-9","fields":{{"summary":"Deep","description":{{"type":"doc","version":1,"content":[{description}]}}}}}}"#
        )
    }

    #[test]
    fn test_parse_json_accepts_deeply_nested_documents() {
        let body = nested_issue_body(500);
        assert!(serde_json::from_str::<Issue>(&body).is_err());

        let issue: Issue = parse_json(&body).unwrap();
        let description = issue.fields.description.as_ref().unwrap();
        assert_eq!(crate::document::decode(description), "buried");
    }

    #[test]
    fn test_parse_json_rejects_trailing_data() {
        assert!(parse_json::<Issue>(r#"{"key":"PROJ-1","fields":{}} extra"#).is_err());
    }

    #[rstest]
    #[case::messages(
        404,
        r#"{"errorMessages":["Issue does not exist"],"errors":{}}"#,
        "Jira API error (404): Issue does not exist"
    )]
    #[case::field_errors(
        400,
        r#"{"errorMessages":[],"errors":{"summary":"You must specify a summary."}}"#,
        "Jira API error (400): summary: You must specify a summary."
    )]
    #[case::raw_body(502, "Bad Gateway\n", "Jira API error (502): Bad Gateway")]
    fn test_api_error_detail(#[case] status: u16, #[case] body: &str, #[case] expected: &str) {
        let error = api_error(status, body);

        assert_eq!(error.status(), Some(status));
        assert_eq!(error.to_string(), expected);
    }
}
