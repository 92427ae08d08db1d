//! CLI command implementations
//!
//! Each subcommand gets a module with an `Args` struct and a `run`
//! function. Argument parsing stays in main.rs; these modules hold the
//! behavior.

pub mod cursor;
pub mod output;
pub mod scan;
pub mod transfer;

use crate::config::ListingConfig;
use anyhow::Context;
use std::path::PathBuf;

/// Load the listing config from an explicit path, or defaults when no
/// path is given.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ListingConfig> {
    match path {
        Some(path) => ListingConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ListingConfig::default()),
    }
}
