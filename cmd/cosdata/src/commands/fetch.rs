//! Vector fetch command.

use clap::Args;

use giztoy_cosdata::VectorId;

use super::{create_client, get_context, output_result, print_verbose};
use crate::Cli;

/// Fetch a stored vector by id.
///
/// Numeric ids are sent as integers, anything else as a string.
#[derive(Args)]
pub struct FetchCommand {
    /// Collection name
    collection: String,
    /// Vector id
    id: String,
}

/// Interprets a command-line id the way it was most likely stored.
fn parse_id(raw: &str) -> VectorId {
    match raw.parse::<i64>() {
        Ok(n) => VectorId::Int(n),
        Err(_) => VectorId::Str(raw.to_string()),
    }
}

impl FetchCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        print_verbose(cli, &format!("Using context: {}", ctx.name));

        let client = create_client(&ctx)?;
        let index = client.get_collection(&self.collection).await?.dense_index();
        let vector = index.fetch_vector(parse_id(&self.id)).await?;
        output_result(cli, &vector)
    }
}
