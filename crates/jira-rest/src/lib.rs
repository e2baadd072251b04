//! Typed Jira Cloud REST v3 client.
//!
//! This crate is the backend half of the Jira MCP server:
//!
//! - [`config`]: per-instance settings read from the environment
//! - [`document`]: Atlassian Document Format encode/decode
//! - [`models`]: typed request and response bodies
//! - [`backend`]: the [`JiraBackend`] trait (and `MockBackend` for tests)
//! - [`client`]: the reqwest-based [`JiraClient`]
//!
//! # Example
//!
//! ```no_run
//! use jira_rest::{InstanceConfig, JiraBackend, JiraClient, SearchRequest};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InstanceConfig::resolve(Some("acme"))?;
//!     let client = JiraClient::new(config)?;
//!
//!     let page = client.search(&SearchRequest::new("assignee = currentUser()")).await?;
//!     println!("{} issue(s)", page.issues.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod models;

pub use backend::JiraBackend;
#[cfg(any(test, feature = "test-util"))]
pub use backend::{BackendCall, MockBackend};
pub use client::JiraClient;
pub use config::InstanceConfig;
pub use document::{decode, encode, Node, RichText};
pub use error::{Error, Result};
pub use models::SearchRequest;
