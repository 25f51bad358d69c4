use super::render::rule;
use super::{CommandOutput, Context};
use crate::cli::CliError;
use research_cache::{Category, QueryEngine, freshness, is_expired};
use tracing::instrument;

/// `rcache show`
#[instrument(skip(ctx))]
pub fn execute_show(
    ctx: &Context,
    id: &str,
    category: Option<Category>,
) -> Result<CommandOutput, CliError> {
    let engine = QueryEngine::new(&ctx.store);
    let entry = match category {
        Some(category) => engine.show(category, id)?,
        None => engine.show_by_id(id)?,
    };

    let mut lines = vec![
        rule(),
        format!("Cache Entry: {}", entry.topic),
        rule(),
        String::new(),
        format!("ID: {}", entry.id),
        format!("Category: {}", entry.category),
        format!("Date: {}", entry.created_at),
        format!(
            "Expired: {}",
            if is_expired(&entry, ctx.today) { "Yes" } else { "No" }
        ),
        format!("Expiry: {}", entry.expires_at),
    ];
    if let Some(hash) = &entry.codebase_hash {
        lines.push(format!("Codebase hash: {hash}"));
    }
    if !entry.tags.is_empty() {
        lines.push(format!("Tags: {}", entry.tags.join(", ")));
    }
    if !entry.related_files.is_empty() {
        lines.push(format!("Related files: {}", entry.related_files.join(", ")));
    }
    lines.extend([
        String::new(),
        rule(),
        "Content:".to_string(),
        rule(),
        String::new(),
        entry.content.clone(),
    ]);

    let data = serde_json::json!({
        "entry": &entry,
        "freshness": freshness(&entry, ctx.today, None),
    });
    CommandOutput::new(lines.join("\n"), &data)
}
