//! Cosdata CLI - A command line interface for the Cosdata vector database.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{CollectionCommand, ConfigCommand, FetchCommand, IndexCommand, QueryCommand, UpsertCommand};

/// Cosdata CLI - A command line interface for the Cosdata vector database.
///
/// This tool lets you manage collections and dense indexes, upsert vectors
/// transactionally, and run nearest-neighbor queries.
///
/// Configuration is stored in ~/.giztoy/cosdata/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "cosdata")]
#[command(about = "Cosdata vector database CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.giztoy/cosdata/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Manage collections
    Collection(CollectionCommand),
    /// Manage dense indexes
    Index(IndexCommand),
    /// Upsert vectors from a file in one transaction
    Upsert(UpsertCommand),
    /// Nearest-neighbor search
    Query(QueryCommand),
    /// Fetch a vector by id
    Fetch(FetchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Collection(cmd) => cmd.run(&cli).await,
        Commands::Index(cmd) => cmd.run(&cli).await,
        Commands::Upsert(cmd) => cmd.run(&cli).await,
        Commands::Query(cmd) => cmd.run(&cli).await,
        Commands::Fetch(cmd) => cmd.run(&cli).await,
    }
}
