use super::render::entry_summary;
use super::{CommandOutput, Context};
use crate::cli::CliError;
use research_cache::{Category, ListFilter, QueryEngine};
use tracing::instrument;

/// `rcache list`
#[instrument(skip(ctx))]
pub fn execute_list(
    ctx: &Context,
    category: Option<Category>,
    hide_expired: bool,
    codebase_hash: Option<String>,
    verbose: bool,
) -> Result<CommandOutput, CliError> {
    let filter = ListFilter {
        category,
        hide_expired,
        current_hash: codebase_hash,
    };
    let listing = QueryEngine::new(&ctx.store).list(&filter, ctx.today)?;
    tracing::debug!(
        count = listing.entries.len(),
        warnings = listing.warnings,
        "Listed cache entries"
    );

    let text = if listing.entries.is_empty() {
        "No cache entries found.".to_string()
    } else {
        let mut lines = vec![format!("Found {} cache entries:", listing.entries.len()), String::new()];
        for entry in &listing.entries {
            lines.extend(entry_summary(
                entry,
                ctx.today,
                filter.current_hash.as_deref(),
                verbose,
            ));
        }
        lines.join("\n").trim_end().to_string()
    };

    Ok(CommandOutput::new(text, &listing)?.with_warnings(listing.warnings))
}

/// `rcache search`
#[instrument(skip(ctx))]
pub fn execute_search(ctx: &Context, keyword: &str, verbose: bool) -> Result<CommandOutput, CliError> {
    let results = QueryEngine::new(&ctx.store).search(keyword, ctx.today)?;
    tracing::debug!(
        hits = results.hits.len(),
        warnings = results.warnings,
        "Searched cache entries"
    );

    let text = if results.hits.is_empty() {
        format!("No cache entries found matching '{keyword}'")
    } else {
        let mut lines = vec![format!("Found {} matching entries:", results.hits.len()), String::new()];
        for hit in &results.hits {
            lines.extend(entry_summary(&hit.entry, ctx.today, None, verbose));
        }
        lines.join("\n").trim_end().to_string()
    };

    Ok(CommandOutput::new(text, &results)?.with_warnings(results.warnings))
}
