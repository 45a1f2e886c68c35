//! Transactional upsert command.

use clap::Args;
use serde::Serialize;

use giztoy_cosdata::{Error, Transaction, Vector, BATCH_SIZE};

use super::{
    create_client, get_context, load_request, output_result, print_success, print_verbose,
    require_input_file,
};
use crate::Cli;

/// Upsert vectors from a YAML or JSON file.
///
/// The file holds a list of `{id, values, ...metadata}` objects. All of
/// them are written in a single transaction, in batches of 200, and
/// committed together. Any failure aborts the whole transaction.
///
/// Example: cosdata upsert docs -f vectors.yaml
#[derive(Args)]
pub struct UpsertCommand {
    /// Collection name
    collection: String,
}

#[derive(Serialize)]
struct UpsertSummary<'a> {
    collection: &'a str,
    transaction_id: String,
    vectors: usize,
    batches: usize,
}

impl UpsertCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let vectors: Vec<Vector> = load_request(input_file)?;
        if vectors.is_empty() {
            anyhow::bail!("no vectors in {}", input_file);
        }

        let ctx = get_context(cli)?;
        print_verbose(cli, &format!("Using context: {}", ctx.name));
        print_verbose(cli, &format!("Loaded {} vectors from {}", vectors.len(), input_file));

        let client = create_client(&ctx)?;
        let index = client.get_collection(&self.collection).await?.dense_index();

        let transaction_id = index
            .with_transaction(async |txn: &mut Transaction| {
                txn.upsert(&vectors).await?;
                Ok::<_, Error>(txn.id().unwrap_or_default().to_string())
            })
            .await?;

        print_success(&format!(
            "Committed {} vectors to \"{}\"",
            vectors.len(),
            self.collection
        ));
        output_result(
            cli,
            &UpsertSummary {
                collection: &self.collection,
                transaction_id,
                vectors: vectors.len(),
                batches: vectors.len().div_ceil(BATCH_SIZE),
            },
        )
    }
}
