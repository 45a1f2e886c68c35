//! Collection management commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use giztoy_cosdata::{Collection, DEFAULT_DIMENSION};

use super::{create_client, get_context, output_result, print_success, print_verbose};
use crate::Cli;

/// Collection management.
///
/// Supports create, get, list, and delete operations.
#[derive(Args)]
pub struct CollectionCommand {
    #[command(subcommand)]
    command: CollectionSubcommand,
}

#[derive(Subcommand)]
enum CollectionSubcommand {
    /// Create a collection
    Create {
        /// Collection name
        name: String,
        /// Dense vector dimension
        #[arg(long, default_value_t = DEFAULT_DIMENSION)]
        dimension: usize,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },
    /// Show a collection
    Get {
        /// Collection name
        name: String,
    },
    /// List collections
    List {
        /// Print the server response unchanged
        #[arg(long)]
        raw: bool,
    },
    /// Delete a collection
    Delete {
        /// Collection name
        name: String,
    },
}

/// Printable collection summary.
#[derive(Serialize)]
struct CollectionSummary<'a> {
    name: &'a str,
    dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a Collection> for CollectionSummary<'a> {
    fn from(c: &'a Collection) -> Self {
        Self {
            name: c.name(),
            dimension: c.dimension(),
            description: c.description(),
        }
    }
}

impl CollectionCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        print_verbose(cli, &format!("Using context: {}", ctx.name));
        let client = create_client(&ctx)?;

        match &self.command {
            CollectionSubcommand::Create {
                name,
                dimension,
                description,
            } => {
                if *dimension == 0 {
                    anyhow::bail!("dimension must be positive");
                }
                print_verbose(cli, &format!("Creating collection {} (dim={})", name, dimension));
                let collection = client
                    .create_collection(name, *dimension, description.as_deref())
                    .await?;
                print_success(&format!("Collection \"{}\" created", name));
                output_result(cli, &CollectionSummary::from(&collection))
            }

            CollectionSubcommand::Get { name } => {
                let info = client.collection_info(name).await?;
                output_result(cli, &info)
            }

            CollectionSubcommand::List { raw } => {
                if *raw {
                    let value = client.list_collections().await?;
                    return output_result(cli, &value);
                }
                let collections = client.collections().await?;
                let summaries: Vec<CollectionSummary> =
                    collections.iter().map(CollectionSummary::from).collect();
                output_result(cli, &summaries)
            }

            CollectionSubcommand::Delete { name } => {
                client.delete_collection(name).await?;
                print_success(&format!("Collection \"{}\" deleted", name));
                Ok(())
            }
        }
    }
}
