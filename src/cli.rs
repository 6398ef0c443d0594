use crate::search::DEFAULT_LIMIT;
use crate::sources::SourceConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "apidocs-mcp")]
#[command(about = "Search REST API documentation from API Blueprint and OpenAPI sources", long_about = None)]
pub struct Cli {
    /// Directory holding the documentation sources
    #[arg(long, global = true, env = "APIDOCS_DIR", default_value = "docs")]
    pub docs_dir: PathBuf,

    /// Source manifest (default: <docs-dir>/sources.toml when present)
    #[arg(long, global = true, env = "APIDOCS_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the MCP tools over stdio (default)
    Serve,
    /// Run one search and print the results
    Search {
        query: String,
        #[arg(short, long)]
        api: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },
    /// Parse every source and report endpoints, warnings and failures
    Check,
}

impl Cli {
    pub fn source_config(&self) -> SourceConfig {
        let config = SourceConfig::new(&self.docs_dir);
        match &self.manifest {
            Some(manifest) => config.with_manifest(manifest),
            None => config,
        }
    }

    pub fn subcommand(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["apidocs-mcp", "--docs-dir", "apiary"]);
        check!(matches!(cli.subcommand(), Commands::Serve));
        check!(cli.source_config().manifest_path() == PathBuf::from("apiary/sources.toml"));
    }

    #[test]
    fn search_arguments() {
        let cli = Cli::parse_from(["apidocs-mcp", "search", "create table", "-m", "post", "-n", "5"]);
        let_assert!(Commands::Search { query, api, method, limit } = cli.subcommand());
        check!(query == "create table");
        check!(api.is_none());
        check!(method.as_deref() == Some("post"));
        check!(*limit == 5);
    }
}
