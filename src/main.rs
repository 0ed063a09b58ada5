//! Google MCP Server
//!
//! Binary entry point. Runs the MCP server on stdio, or the standalone
//! authentication flow when invoked with the `auth` subcommand.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use google_mcp_server::config::Config;
use google_mcp_server::error::Result;
use google_mcp_server::google::auth::Authenticator;
use google_mcp_server::google::calendar::CalendarClient;
use google_mcp_server::google::gmail::GmailClient;
use google_mcp_server::mcp::server::McpServer;
use google_mcp_server::mcp::tools::ToolHandler;

#[derive(Parser)]
#[command(name = "google-mcp-server")]
#[command(author, version, about = "Google MCP Server mit Schreibzugriff für Gmail und Calendar")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain or refresh the Google credential without starting the server
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    match cli.command {
        Some(Commands::Auth) => {
            let token_path = config.token_path.clone();
            let authenticator = Authenticator::new(config);
            authenticator.ensure_credential().await?;
            eprintln!("Token gültig: {}", token_path.display());
            Ok(())
        }
        None => run_server(config).await,
    }
}

async fn run_server(config: Config) -> Result<()> {
    let authenticator = Arc::new(Authenticator::new(config));

    // No tool works without a credential; failing here ends the process
    authenticator.ensure_credential().await?;

    let gmail = Arc::new(GmailClient::new(authenticator.clone()));
    let calendar = Arc::new(CalendarClient::new(authenticator.clone()));
    let tool_handler = ToolHandler::new(gmail, calendar);

    tracing::info!("Google MCP server listening on stdio");
    let mut server = McpServer::new(tool_handler);
    server.run_stdio().await
}
