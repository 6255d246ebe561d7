//! MongoDB browsing and export tool.
//!
//! This binary lists databases and collections on a MongoDB server and
//! exports collections as JSON, either directly or through the HTTP API
//! used by the browser front end.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - No credentials stored or logged
//! - One short-lived connection per operation

use clap::Parser;
use mongo_exporter::cli::{Cli, Command};
use mongo_exporter::commands;
use mongo_exporter_core::{Result, logging::init_logging};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format.into(),
    )?;

    let engine = commands::build_engine(cli.global.connection_config())?;

    let result = match &cli.command {
        Command::Serve(args) => commands::serve(engine, args).await,
        Command::Databases(args) => commands::list_databases(&engine, args).await,
        Command::Collections(args) => commands::list_collections(&engine, args).await,
        Command::Export(args) => commands::export(&engine, args).await.map(|_| ()),
    };

    if let Err(ref e) = result {
        error!("{}", e);
    }
    result
}
