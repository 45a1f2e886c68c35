//! CLI utilities for giztoy.
//!
//! This crate provides common utilities for CLI applications.

pub mod config;
pub mod output;

pub use config::{load_config, mask_secret, Config, Context};
pub use output::{print_success, print_verbose, Output, OutputFormat};
