//! MCP server for Jira issue tracking.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes a
//! Jira Cloud instance to AI assistants like Claude.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and talks to
//! Jira through the `JiraBackend` trait from the `jira-rest` crate:
//!
//! - [`registry`]: the fixed tool catalog and argument schemas
//! - [`dispatcher`]: argument extraction, backend calls, error folding
//! - [`format`]: plain-text rendering of Jira responses
//! - [`server`]: the rmcp `ServerHandler`
//!
//! # Tools
//!
//! ## Queries
//! - `search` - Search issues with JQL
//! - `get_issue` - Show issue details with recent comments
//! - `list_projects` - List accessible projects
//!
//! ## Modification
//! - `create_issue` - Create a new issue
//! - `update_issue` - Update selected fields of an issue
//! - `add_comment` - Comment on an issue
//! - `transition_issue` - Move an issue through its workflow

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod models;
pub mod registry;
pub mod server;

pub use dispatcher::{Dispatcher, Outcome, ToolResult};
pub use error::{Error, Result};
pub use server::JiraMcpServer;
