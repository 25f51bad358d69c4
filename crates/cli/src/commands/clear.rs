use super::{CommandOutput, Context};
use crate::cli::{CliError, ClearArgs};
use research_cache::{Category, Maintenance};
use tracing::instrument;

/// `rcache invalidate`
#[instrument(skip(ctx))]
pub fn execute_invalidate(
    ctx: &Context,
    id: &str,
    category: Option<Category>,
) -> Result<CommandOutput, CliError> {
    let maintenance = Maintenance::new(&ctx.store);
    let removed = match category {
        Some(category) => maintenance.invalidate(category, id)?,
        None => maintenance.invalidate_by_id(id)?,
    };
    if !removed {
        return Err(CliError::not_found(format!("Cache entry not found: {id}")));
    }

    let data = serde_json::json!({ "id": id, "removed": true });
    CommandOutput::new(format!("✓ Cache entry invalidated: {id}"), &data)
}

/// `rcache clear`
#[instrument(skip(ctx))]
pub fn execute_clear(ctx: &Context, args: &ClearArgs) -> Result<CommandOutput, CliError> {
    let report = Maintenance::new(&ctx.store).clear(args.scope(), args.yes, ctx.today)?;

    let mut text = format!("✓ Cleared {} cache entries", report.removed);
    if report.warnings > 0 {
        text.push_str(&format!(
            "\n  Left {} malformed entries in place",
            report.warnings
        ));
    }
    Ok(CommandOutput::new(text, &report)?.with_warnings(report.warnings))
}
