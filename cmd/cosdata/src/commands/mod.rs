//! CLI commands module.

mod collection;
mod config;
mod fetch;
mod index;
mod query;
mod upsert;
mod util;

pub use collection::CollectionCommand;
pub use config::ConfigCommand;
pub use fetch::FetchCommand;
pub use index::IndexCommand;
pub use query::QueryCommand;
pub use upsert::UpsertCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
