use super::render::rule;
use super::{CommandOutput, Context};
use crate::cli::CliError;
use research_cache::{QueryEngine, Stats};
use tracing::instrument;

/// Months shown under "Recent Activity"
const RECENT_MONTHS: usize = 3;

/// `rcache stats`
#[instrument(skip(ctx))]
pub fn execute_stats(ctx: &Context, top: usize) -> Result<CommandOutput, CliError> {
    let stats = QueryEngine::new(&ctx.store).stats(ctx.today)?;
    let text = render_stats(&stats, top);
    Ok(CommandOutput::new(text, &stats)?.with_warnings(stats.malformed))
}

fn render_stats(stats: &Stats, top: usize) -> String {
    let mut lines = vec![
        rule(),
        "Research Cache Statistics".to_string(),
        rule(),
        String::new(),
        format!("Total entries: {}", stats.total),
        format!("  Active: {}", stats.active),
        format!("  Expired: {}", stats.expired),
    ];
    if stats.malformed > 0 {
        lines.push(format!("  Malformed: {}", stats.malformed));
    }
    lines.push(String::new());

    let categories: Vec<_> = stats.by_category.iter().filter(|(_, n)| **n > 0).collect();
    if !categories.is_empty() {
        lines.push("By Category:".to_string());
        for (category, count) in categories {
            lines.push(format!("  {category}: {count}"));
        }
        lines.push(String::new());
    }

    if !stats.top_tags.is_empty() && top > 0 {
        lines.push("Top Tags:".to_string());
        for tag in stats.top_tags.iter().take(top) {
            lines.push(format!("  {}: {}", tag.tag, tag.count));
        }
        lines.push(String::new());
    }

    if !stats.by_month.is_empty() {
        lines.push("Recent Activity:".to_string());
        for (month, count) in stats.by_month.iter().rev().take(RECENT_MONTHS) {
            lines.push(format!("  {month}: {count} entries"));
        }
        lines.push(String::new());
    }

    lines.push(rule());
    lines.join("\n")
}
