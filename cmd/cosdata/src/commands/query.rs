//! Nearest-neighbor query command.

use clap::Args;

use giztoy_cosdata::DEFAULT_NN_COUNT;

use super::{create_client, get_context, output_result, print_verbose};
use crate::Cli;

/// Search a collection for the nearest neighbors of a vector.
///
/// Example: cosdata query docs --vector 0,0,0,1 --nn-count 3
#[derive(Args)]
pub struct QueryCommand {
    /// Collection name
    collection: String,
    /// Query vector, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    vector: Vec<f32>,
    /// Number of neighbors to return
    #[arg(long, default_value_t = DEFAULT_NN_COUNT)]
    nn_count: usize,
}

impl QueryCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        if self.nn_count == 0 {
            anyhow::bail!("nn-count must be positive");
        }

        let ctx = get_context(cli)?;
        print_verbose(cli, &format!("Using context: {}", ctx.name));
        print_verbose(cli, &format!("Query dimension: {}", self.vector.len()));

        let client = create_client(&ctx)?;
        let collection = client.get_collection(&self.collection).await?;
        if collection.dimension() != self.vector.len() {
            anyhow::bail!(
                "query vector has {} values, collection \"{}\" expects {}",
                self.vector.len(),
                self.collection,
                collection.dimension()
            );
        }

        let results = collection
            .dense_index()
            .query(&self.vector, self.nn_count)
            .await?;
        output_result(cli, &results)
    }
}
