//! MCP surface: wires the tool catalog and client registry into rmcp's
//! `ServerHandler`.

use atlassian_tools::catalog::ToolCatalog;
use atlassian_tools::registry::ClientRegistry;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListToolsResult, PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Tools for a Confluence wiki and a Jira issue tracker.\n\
    Read tools (confluence_get_page, confluence_search_pages, confluence_get_spaces, \
    jira_get_issue, jira_search_issues, jira_get_createmeta) are safe to retry.\n\
    Create tools are NOT idempotent: a blind retry creates a duplicate page/issue. \
    Check for an existing result before retrying a create.\n\
    Search tools take raw CQL/JQL strings; they are passed to the backend uninterpreted.\n\
    Every result carries the normalized fields plus the unmodified backend payload under `raw`.";

#[derive(Clone)]
pub struct AtlassianServer {
    catalog: Arc<ToolCatalog>,
    registry: Arc<ClientRegistry>,
}

impl AtlassianServer {
    pub fn new(catalog: ToolCatalog, registry: ClientRegistry) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
        }
    }
}

impl ServerHandler for AtlassianServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Atlassian MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.catalog.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();

        match self.catalog.call(&self.registry, &request.name, arguments).await {
            Ok(value) => {
                // Both `structured_content` and `Content::text(...)`: some MCP
                // clients only render `content`.
                let text = serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
                Ok(CallToolResult {
                    content: vec![Content::text(text)],
                    structured_content: Some(value),
                    is_error: Some(false),
                    meta: None,
                })
            }
            Err(e) if e.is_validation() => Err(McpError::invalid_params(e.to_string(), None)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
