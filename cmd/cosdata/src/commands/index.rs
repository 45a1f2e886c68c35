//! Dense index commands.

use clap::{Args, Subcommand};

use giztoy_cosdata::{DistanceMetric, HnswParams, IndexParams};

use super::{create_client, get_context, load_request, print_success, print_verbose};
use crate::Cli;

/// Dense index management.
///
/// Index parameters can be given as flags, or loaded from a YAML/JSON
/// file with -f (flags are ignored in that case).
#[derive(Args)]
pub struct IndexCommand {
    #[command(subcommand)]
    command: IndexSubcommand,
}

#[derive(Subcommand)]
enum IndexSubcommand {
    /// Create the dense index of a collection
    Create {
        /// Collection name
        collection: String,
        /// Distance metric (cosine, euclidean, dot)
        #[arg(long, default_value = "cosine")]
        metric: DistanceMetric,
        /// Quantization type
        #[arg(long, default_value = "auto")]
        quantization: String,
        /// Quantization sample threshold
        #[arg(long, default_value_t = 100)]
        sample_threshold: u32,
        /// HNSW layer count
        #[arg(long, default_value_t = 7)]
        num_layers: u32,
        /// HNSW cache size
        #[arg(long, default_value_t = 1000)]
        max_cache_size: u32,
        /// HNSW ef at build time
        #[arg(long, default_value_t = 512)]
        ef_construction: u32,
        /// HNSW ef at query time
        #[arg(long, default_value_t = 256)]
        ef_search: u32,
        /// Neighbors per node
        #[arg(long, default_value_t = 32)]
        neighbors_count: u32,
        /// Neighbors per node on layer 0
        #[arg(long, default_value_t = 64)]
        level_0_neighbors_count: u32,
    },
}

impl IndexCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            IndexSubcommand::Create {
                collection,
                metric,
                quantization,
                sample_threshold,
                num_layers,
                max_cache_size,
                ef_construction,
                ef_search,
                neighbors_count,
                level_0_neighbors_count,
            } => {
                let params = match &cli.input {
                    Some(path) => load_request::<IndexParams>(path)?,
                    None => IndexParams {
                        distance_metric: *metric,
                        quantization: quantization.clone(),
                        sample_threshold: *sample_threshold,
                        hnsw: HnswParams {
                            num_layers: *num_layers,
                            max_cache_size: *max_cache_size,
                            ef_construction: *ef_construction,
                            ef_search: *ef_search,
                            neighbors_count: *neighbors_count,
                            level_0_neighbors_count: *level_0_neighbors_count,
                        },
                    },
                };

                let ctx = get_context(cli)?;
                print_verbose(cli, &format!("Using context: {}", ctx.name));
                print_verbose(cli, &format!("Index params: {:?}", params));

                let client = create_client(&ctx)?;
                let collection = client.get_collection(collection).await?;
                collection.create_index(&params).await?;

                print_success(&format!(
                    "Dense index ({}) created on \"{}\"",
                    params.distance_metric,
                    collection.name()
                ));
                Ok(())
            }
        }
    }
}
