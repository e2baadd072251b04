//! MCP server implementation.
//!
//! This module wires the registry and dispatcher into rmcp's
//! [`ServerHandler`]. Tool listing and tool calls are answered directly
//! rather than through rmcp's tool router so that unknown names and bad
//! arguments come back as ordinary text results.

use crate::dispatcher::{Dispatcher, ToolResult};
use crate::error::{Error, Result};
use crate::registry;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;
use tracing::info;

/// The Jira MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct JiraMcpServer {
    /// Tool call handling, including the backend handle.
    dispatcher: Arc<Dispatcher>,
}

impl JiraMcpServer {
    /// Create a server around a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// The dispatcher handling tool calls.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Tool definitions as advertised over MCP.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        registry::definitions()
            .iter()
            .map(registry::ToolDefinition::to_tool)
            .collect()
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to start or the service task
    /// aborts.
    pub async fn run(self) -> Result<()> {
        info!("Starting MCP server on stdio");
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        info!(?reason, "MCP server stopped");
        Ok(())
    }
}

impl From<ToolResult> for CallToolResult {
    fn from(result: ToolResult) -> Self {
        CallToolResult::success(vec![Content::text(result.text)])
    }
}

impl ServerHandler for JiraMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jira-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Jira MCP server. Search with JQL, read and create issues, comment, and move \
                 issues through their workflow."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let result = self
            .dispatcher
            .call(&request.name, request.arguments)
            .await;
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jira_rest::MockBackend;

    fn server() -> JiraMcpServer {
        let backend = Arc::new(MockBackend::new());
        JiraMcpServer::new(Dispatcher::new(backend, "https://acme.atlassian.net"))
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();

        assert_eq!(info.server_info.name, "jira-mcp");
        assert!(!info.server_info.version.is_empty());
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_tools_lists_all_seven() {
        let tools = server().tools();
        let names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();

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
        assert!(tools.iter().all(|t| t.description.is_some()));
    }

    #[tokio::test]
    async fn test_tool_result_becomes_single_text_content() {
        let result = server().dispatcher().call("nope", None).await;
        let call_result: CallToolResult = result.into();

        assert_eq!(call_result.content.len(), 1);
        let text = call_result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        assert_eq!(text, "Unknown tool: nope");
        assert_ne!(call_result.is_error, Some(true));
    }
}
