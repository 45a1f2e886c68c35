//! Utility functions for CLI commands.

use std::path::Path;
use std::time::Duration;

use giztoy_cli::{load_config, Config, Context, Output, OutputFormat};
use giztoy_cosdata::Client;

use crate::Cli;

const APP_NAME: &str = "cosdata";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context configuration to use.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;

    if let Some(ctx) = cfg.resolve_context(cli.context.as_deref()) {
        return Ok(ctx.clone());
    }
    match cli.context.as_deref() {
        Some(name) => anyhow::bail!("context '{}' not found", name),
        None => anyhow::bail!(
            "no context specified. Use -c flag or set a default context with 'cosdata config use-context'"
        ),
    }
}

/// Loads a request from a YAML or JSON file.
pub fn load_request<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    parse_request(path, &content)
}

fn parse_request<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> anyhow::Result<T> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("yaml");

    let result = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };

    Ok(result)
}

/// Requires input file to be provided.
pub fn require_input_file(cli: &Cli) -> anyhow::Result<&str> {
    cli.input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("input file is required, use -f flag"))
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone()).write(result)
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    giztoy_cli::print_verbose(cli.verbose, msg);
}

pub use giztoy_cli::print_success;

/// Creates a Cosdata client from context configuration.
pub fn create_client(ctx: &Context) -> anyhow::Result<Client> {
    let mut builder = Client::builder()
        .password(&ctx.password)
        .verify_ssl(!ctx.insecure);

    if !ctx.username.is_empty() {
        builder = builder.username(&ctx.username);
    }
    if !ctx.host.is_empty() {
        builder = builder.host(&ctx.host);
    }
    if ctx.timeout > 0 {
        builder = builder.timeout(Duration::from_secs(ctx.timeout));
    }

    Ok(builder.build()?)
}
