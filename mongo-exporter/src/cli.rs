//! Command line interface definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use mongo_exporter_core::logging::LogFormat;
use mongo_exporter_core::ConnectionConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address for `serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8888";

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "mongo-exporter")]
#[command(about = "Browse and export MongoDB collections as JSON")]
#[command(version)]
#[command(long_about = "
mongo-exporter - MongoDB browsing and JSON export

Lists databases and collections on a MongoDB server and exports whole
collections as a single JSON document, either from the command line or
through a small HTTP service used by the browser front end.

SECURITY FEATURES:
- Read-only operations only
- Connection strings are never stored or logged
- One short-lived connection per operation

EXAMPLES:
  mongo-exporter databases --mongo-url mongodb://localhost:27017
  mongo-exporter collections shop
  mongo-exporter export shop --collections users,orders --output shop.json
  mongo-exporter serve --bind 0.0.0.0:8888
")]
pub struct Cli {
    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// List non-system databases
    Databases(TargetArgs),
    /// List collections of a database with document counts
    Collections(CollectionsArgs),
    /// Export collections to a JSON file
    Export(ExportArgs),
}

/// Options for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "MONGO_EXPORTER_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Allowed CORS origins; any origin when omitted
    #[arg(
        long = "cors-origin",
        value_name = "ORIGIN",
        help = "Allowed CORS origin (repeatable, '*' for any)"
    )]
    pub cors_origins: Vec<String>,
}

/// Connection string of the server to reach.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// MongoDB connection URL
    #[arg(
        long,
        env = "MONGO_URL",
        hide_env_values = true,
        help = "MongoDB connection string (credentials are never logged)"
    )]
    pub mongo_url: String,
}

/// Options for `collections`.
#[derive(Args, Debug)]
pub struct CollectionsArgs {
    /// Server to reach
    #[command(flatten)]
    pub target: TargetArgs,

    /// Database name
    pub database: String,
}

/// Options for `export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Server to reach
    #[command(flatten)]
    pub target: TargetArgs,

    /// Database name
    pub database: String,

    /// Collections to export; all collections when omitted
    #[arg(long, value_delimiter = ',', help = "Comma-separated list of collections")]
    pub collections: Vec<String>,

    /// Output file path
    #[arg(short, long, help = "Output file path (default: <db>_<scope>_<millis>.json)")]
    pub output: Option<PathBuf>,

    /// Enable compression
    #[arg(long, help = "Compress output using Zstandard (.zst)")]
    pub compress: bool,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Logging and timeout options.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// Connection timeout in milliseconds
    #[arg(
        long,
        global = true,
        env = "MONGO_EXPORTER_CONNECT_TIMEOUT_MS",
        default_value_t = 5000
    )]
    pub connect_timeout_ms: u64,

    /// Server selection timeout in milliseconds
    #[arg(
        long,
        global = true,
        env = "MONGO_EXPORTER_SERVER_SELECTION_TIMEOUT_MS",
        default_value_t = 5000
    )]
    pub server_selection_timeout_ms: u64,
}

impl GlobalArgs {
    /// Engine configuration from the timeout flags.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new()
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_server_selection_timeout(Duration::from_millis(self.server_selection_timeout_ms))
    }
}
