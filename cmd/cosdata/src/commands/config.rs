//! Configuration management commands.

use clap::{Args, Subcommand};

use giztoy_cli::config::{mask_secret, Context as CliContext};
use giztoy_cosdata::{DEFAULT_HOST, DEFAULT_USERNAME};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to manage multiple servers,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.giztoy/cosdata/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Server address
        #[arg(long)]
        host: Option<String>,
        /// Login user
        #[arg(long)]
        username: Option<String>,
        /// Login password
        #[arg(long)]
        password: String,
        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                host,
                username,
                password,
                insecure,
                timeout,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    host: host.clone().unwrap_or_default(),
                    username: username.clone().unwrap_or_default(),
                    password: password.clone(),
                    insecure: *insecure,
                    timeout: timeout.unwrap_or(0),
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<36} {}", "CURRENT", "NAME", "HOST", "USERNAME");

                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.contexts.get(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let host = if ctx.host.is_empty() { DEFAULT_HOST } else { &ctx.host };
                    let username = if ctx.username.is_empty() {
                        DEFAULT_USERNAME
                    } else {
                        &ctx.username
                    };
                    println!("{:<8} {:<20} {:<36} {}", current, name, host, username);
                }

                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                if cfg.contexts.is_empty() {
                    return Ok(());
                }

                println!("\nContext details:");
                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.contexts.get(name) else {
                        continue;
                    };
                    println!("\n  {}:", name);
                    if !ctx.host.is_empty() {
                        println!("    Host: {}", ctx.host);
                    }
                    if !ctx.username.is_empty() {
                        println!("    Username: {}", ctx.username);
                    }
                    println!("    Password: {}", mask_secret(&ctx.password));
                    if ctx.insecure {
                        println!("    TLS verification: disabled");
                    }
                    if ctx.timeout > 0 {
                        println!("    Timeout: {}s", ctx.timeout);
                    }
                }

                Ok(())
            }
        }
    }
}
