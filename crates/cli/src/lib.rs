//! Command-line front end for the research cache.
//!
//! The binary (`rcache`) parses flags, initializes tracing and hands the
//! parsed command to [`commands::execute`]. Everything here is a thin
//! translation layer over `research_cache`.

pub mod cli;
pub mod commands;
pub mod tracing;

use cli::{Cli, CliError};
use commands::Context;
use research_cache::{Store, StoreConfig};

/// Build the command context from global flags
pub fn context_from_cli(cli: &Cli, today: chrono::NaiveDate) -> Result<Context, CliError> {
    let config = match &cli.cache_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::resolve()?,
    }
    .with_default_expiry_days(cli.expiry_days);

    ::tracing::debug!(
        root = %config.root_dir.display(),
        default_expiry_days = config.default_expiry_days,
        "Resolved cache configuration"
    );

    Ok(Context {
        store: Store::new(config),
        today,
    })
}
