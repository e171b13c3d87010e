//! MCP stdio server exposing Confluence and Jira as a fixed tool catalog.
//!
//! Backend credentials come from the environment (`CONFLUENCE_*`, `JIRA_*`)
//! and are resolved lazily on the first tool call per backend, so the server
//! starts even when only one backend is configured. Logs go to stderr; stdout
//! carries the MCP protocol.

mod server;

use anyhow::Context as _;
use atlassian_tools::catalog::ToolCatalog;
use atlassian_tools::registry::ClientRegistry;
use clap::Parser;
use rmcp::ServiceExt as _;
use server::AtlassianServer;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "atlassian-mcp-server", version, about)]
struct Cli {
    /// HTTP timeout for backend requests, in seconds.
    #[arg(long, env = "ATLASSIAN_MCP_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Emit logs as JSON lines instead of human-readable output.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let catalog = ToolCatalog::new().context("building tool catalog")?;
    let registry = ClientRegistry::from_env(Duration::from_secs(cli.timeout_secs));
    let handler = AtlassianServer::new(catalog, registry);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_secs = cli.timeout_secs,
        "starting MCP stdio server"
    );

    let service = handler
        .serve(rmcp::transport::stdio())
        .await
        .context("starting stdio transport")?;
    service.waiting().await.context("serving MCP")?;

    tracing::info!("stdio transport closed, shutting down");
    Ok(())
}
