//! Command implementations.
//!
//! Each command returns a [`CommandOutput`] carrying both the text rendering
//! and the JSON payload; `main` decides which one to print.

pub mod add;
pub mod clear;
pub mod list;
mod render;
pub mod show;
pub mod stats;

use crate::cli::{CliError, Commands};
use chrono::NaiveDate;
use research_cache::Store;
use serde::Serialize;

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone)]
pub struct Context {
    /// Store the command operates on
    pub store: Store,
    /// Date used for expiry decisions and default creation dates
    pub today: NaiveDate,
}

/// Result of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Human-readable rendering
    pub text: String,
    /// Payload of the JSON envelope
    pub data: serde_json::Value,
    /// Malformed entries skipped while producing the output
    pub warnings: usize,
}

impl CommandOutput {
    /// Output without warnings
    pub fn new(text: impl Into<String>, data: &impl Serialize) -> Result<Self, CliError> {
        Ok(Self {
            text: text.into(),
            data: to_json(data)?,
            warnings: 0,
        })
    }

    /// Attach a count of skipped malformed entries
    #[must_use]
    pub const fn with_warnings(mut self, warnings: usize) -> Self {
        self.warnings = warnings;
        self
    }
}

fn to_json(data: &impl Serialize) -> Result<serde_json::Value, CliError> {
    serde_json::to_value(data)
        .map_err(|e| CliError::other(format!("JSON serialization failed: {e}")))
}

/// Run a parsed command against the store
pub fn execute(command: Commands, ctx: &Context) -> Result<CommandOutput, CliError> {
    match command {
        Commands::List {
            category,
            hide_expired,
            codebase_hash,
            verbose,
        } => list::execute_list(ctx, category, hide_expired, codebase_hash, verbose),
        Commands::Search { keyword, verbose } => list::execute_search(ctx, &keyword, verbose),
        Commands::Show { id, category } => show::execute_show(ctx, &id, category),
        Commands::Add(args) => add::execute_add(ctx, args),
        Commands::Invalidate { id, category } => clear::execute_invalidate(ctx, &id, category),
        Commands::Clear(args) => clear::execute_clear(ctx, &args),
        Commands::Stats { top } => stats::execute_stats(ctx, top),
        Commands::Id { topic, date } => add::execute_id(ctx, &topic, date),
    }
}
