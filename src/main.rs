use apidocs_mcp::cli::{Cli, Commands};
use apidocs_mcp::format::{format_load_summary, format_search_results};
use apidocs_mcp::logging;
use apidocs_mcp::search::Query;
use apidocs_mcp::server::DocsServer;
use apidocs_mcp::state::{DocState, build_index};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();
    let sources = cli.source_config();

    match cli.subcommand() {
        Commands::Serve => {
            tracing::info!("Starting apidocs-mcp server (docs: {})", sources.docs_dir.display());
            let (state, summary) = DocState::load(sources).await?;
            if summary.has_failures() {
                tracing::warn!("Some sources failed to load:\n{}", format_load_summary(&summary));
            }

            let server = DocsServer::new(Arc::new(state));
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;
            service.waiting().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Search {
            query,
            api,
            method,
            limit,
        } => {
            let (index, _) = build_index(&sources)?;
            let request = Query {
                text: query,
                api_filter: api.as_deref(),
                method_filter: method.as_deref(),
                limit: *limit,
            };
            let hits = index.search(&request)?;
            println!("{}", format_search_results(query, &hits));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let (_, summary) = build_index(&sources)?;
            print!("{}", format_load_summary(&summary));
            Ok(if summary.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
