//! Command-line interface.
//!
//! ```bash
//! jira-mcp --instance acme          # serve MCP on stdio
//! jira-mcp --test-connection acme   # check credentials and exit
//! ```
//!
//! Without `--instance`, the `JIRA_INSTANCE` environment variable selects
//! the instance.

use crate::dispatcher::Dispatcher;
use crate::server::JiraMcpServer;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use jira_rest::models::{CurrentUser, Project};
use jira_rest::{InstanceConfig, JiraBackend, JiraClient};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// Projects listed by name in a connection report.
const REPORT_PROJECT_LIMIT: usize = 5;

/// Jira MCP server - exposes Jira issue tracking to AI assistants over stdio.
#[derive(Parser, Debug)]
#[command(name = "jira-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Jira instance name (e.g. "acme"). Can also use the `JIRA_INSTANCE` env var.
    #[arg(long)]
    pub instance: Option<String>,

    /// Test connection to the specified instance and exit
    #[arg(long, value_name = "INSTANCE")]
    pub test_connection: Option<String>,
}

impl Cli {
    /// Parse arguments from the process command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Run the selected mode.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the server
    /// fails; a failed connection test is reported through the exit code.
    pub async fn execute(self) -> Result<ExitCode> {
        if let Some(instance) = self.test_connection {
            return Ok(test_connection(&instance).await);
        }

        let config = InstanceConfig::resolve(self.instance.as_deref())
            .context("Failed to load configuration")?;
        info!(instance = %config.instance_name, "Loaded configuration");

        let client = JiraClient::new(config).context("Failed to initialize Jira client")?;
        let base_url = client.base_url().to_string();
        let dispatcher = Dispatcher::new(Arc::new(client), base_url);

        JiraMcpServer::new(dispatcher).run().await?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Facts gathered by a connection test.
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    /// The authenticated account.
    pub user: CurrentUser,
    /// Projects visible to that account.
    pub projects: Vec<Project>,
}

impl ConnectionReport {
    /// Query the backend for the current user and visible projects.
    ///
    /// # Errors
    ///
    /// Returns the first backend error encountered.
    pub async fn gather(backend: &dyn JiraBackend) -> jira_rest::Result<Self> {
        let user = backend.myself().await?;
        let projects = backend.list_projects().await?;
        Ok(Self { user, projects })
    }

    /// Indented report lines, without the success banner.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let or_blank = |value: &Option<String>| value.clone().unwrap_or_default();

        let mut lines = vec![
            format!(
                "  User: {} ({})",
                or_blank(&self.user.display_name),
                or_blank(&self.user.email_address)
            ),
            format!("  Account ID: {}", or_blank(&self.user.account_id)),
            format!("  Accessible projects: {}", self.projects.len()),
        ];
        lines.extend(
            self.projects
                .iter()
                .take(REPORT_PROJECT_LIMIT)
                .map(|p| format!("    - [{}] {}", or_blank(&p.key), or_blank(&p.name))),
        );
        if self.projects.len() > REPORT_PROJECT_LIMIT {
            lines.push(format!(
                "    ... and {} more",
                self.projects.len() - REPORT_PROJECT_LIMIT
            ));
        }
        lines
    }
}

/// Check credentials for `instance` and print a report to stdout.
async fn test_connection(instance: &str) -> ExitCode {
    match gather_report(instance).await {
        Ok(report) => {
            println!("{} Connected successfully!", "✓".green());
            for line in report.lines() {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{} Connection failed: {e}", "✗".red());
            ExitCode::FAILURE
        }
    }
}

async fn gather_report(instance: &str) -> jira_rest::Result<ConnectionReport> {
    let config = InstanceConfig::resolve(Some(instance))?;
    println!(
        "Testing connection to {} at {}...",
        config.instance_name, config.base_url
    );
    let client = JiraClient::new(config)?;
    ConnectionReport::gather(&client).await
}
