use super::{CommandOutput, Context};
use crate::cli::{AddArgs, CliError};
use chrono::NaiveDate;
use research_cache::{NewEntry, make_id};
use std::io::Read;
use std::path::Path;
use tracing::instrument;

/// Read research content from a file, or from stdin for `-`
fn read_content(source: &Path) -> Result<String, CliError> {
    if source.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::other(format!("Failed to read content from stdin: {e}")))?;
        return Ok(content);
    }
    std::fs::read_to_string(source).map_err(|e| {
        CliError::config_with_help(
            format!("Failed to read content from {}: {e}", source.display()),
            "Pass a readable file, or - to read from stdin",
        )
    })
}

/// `rcache add`
#[instrument(skip(ctx))]
pub fn execute_add(ctx: &Context, args: AddArgs) -> Result<CommandOutput, CliError> {
    let content = read_content(&args.content)?;

    let mut new = NewEntry::new(args.category, args.topic, content)
        .tags(&args.tags)
        .related_files(&args.related_files);
    if let Some(date) = args.date {
        new = new.created_on(date);
    }
    if let Some(expiry) = args.expiry {
        new = new.expires_on(expiry);
    }
    if let Some(hash) = args.codebase_hash {
        new = new.codebase_hash(hash);
    }

    let entry = new.into_entry(ctx.store.config().default_expiry_days, ctx.today)?;
    let id = ctx.store.add(&entry)?;
    let path = ctx.store.entry_path(entry.category, &id)?;

    let text = [
        format!("✓ Cache entry created: {id}"),
        format!("  Category: {}", entry.category),
        format!("  File: {}", path.display()),
    ]
    .join("\n");
    let data = serde_json::json!({
        "id": id,
        "category": entry.category,
        "path": path,
        "expires_at": entry.expires_at,
    });
    CommandOutput::new(text, &data)
}

/// `rcache id`
#[instrument(skip(ctx))]
pub fn execute_id(
    ctx: &Context,
    topic: &str,
    date: Option<NaiveDate>,
) -> Result<CommandOutput, CliError> {
    let id = make_id(topic, date.unwrap_or(ctx.today));
    let data = serde_json::json!({ "id": id });
    CommandOutput::new(id, &data)
}
