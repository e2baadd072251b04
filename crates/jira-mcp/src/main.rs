//! Jira MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use jira_mcp::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout carries the MCP stream, so logs go to stderr.
    // Example: RUST_LOG=jira_mcp=debug,jira_rest=debug jira-mcp --instance acme
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jira_mcp=info,jira_rest=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting jira-mcp");

    let cli = Cli::parse_args();
    cli.execute().await
}
