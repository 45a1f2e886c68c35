//! Quickstart example.
//!
//! Creates a collection, indexes two vectors in one transaction and
//! queries them back.
//!
//! Run with:
//! ```bash
//! export COSDATA_HOST="http://127.0.0.1:8443"
//! export COSDATA_PASSWORD="admin"
//! cargo run -p giztoy-cosdata --example quickstart
//! ```

use giztoy_cosdata::{Client, DistanceMetric, Transaction, Vector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_env()?;

    let collection = client
        .create_collection("quickstart", 4, Some("quickstart example"))
        .await?;
    println!("Created collection {} (dim={})", collection.name(), collection.dimension());

    let index = collection.index(DistanceMetric::Cosine).await?;

    let vectors = vec![
        Vector::new(1, vec![0.0, 0.0, 0.0, 1.0]).with_field("label", "north"),
        Vector::new(2, vec![1.0, 0.0, 0.0, 0.0]).with_field("label", "east"),
    ];
    index
        .with_transaction(async |txn: &mut Transaction| txn.upsert(&vectors).await)
        .await?;
    println!("Upserted {} vectors", vectors.len());

    let results = index.query(&[0.0, 0.0, 0.0, 1.0], 1).await?;
    println!("Nearest neighbor: {}", serde_json::to_string_pretty(&results)?);

    collection.delete().await?;
    Ok(())
}
