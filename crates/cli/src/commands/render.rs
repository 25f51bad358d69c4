//! Shared text rendering

use chrono::NaiveDate;
use research_cache::{CacheEntry, Freshness, days_until_expiry, freshness};

const RULE_WIDTH: usize = 60;

/// Horizontal rule framing the detailed views
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Status marker shown in front of an entry summary
pub const fn marker(state: Freshness) -> &'static str {
    match state {
        Freshness::Fresh => "✓",
        Freshness::Expired => "EXPIRED",
        Freshness::CodebaseStale => "STALE",
        Freshness::ExpiredAndStale => "EXPIRED STALE",
    }
}

/// Multi-line summary of one entry, followed by a blank line
pub fn entry_summary(
    entry: &CacheEntry,
    today: NaiveDate,
    current_hash: Option<&str>,
    verbose: bool,
) -> Vec<String> {
    let state = freshness(entry, today, current_hash);
    let mut lines = vec![
        format!("{} [{}] {}", marker(state), entry.category, entry.topic),
        format!("   ID: {}", entry.id),
        format!("   Date: {}", entry.created_at),
    ];
    if !entry.tags.is_empty() {
        lines.push(format!("   Tags: {}", entry.tags.join(", ")));
    }
    if verbose {
        let days = days_until_expiry(entry, today);
        let remaining = if days >= 0 {
            format!("{days} days left")
        } else {
            format!("expired {} days ago", days.unsigned_abs())
        };
        lines.push(format!("   Expiry: {} ({remaining})", entry.expires_at));
        if !entry.related_files.is_empty() {
            lines.push(format!("   Related files: {}", entry.related_files.len()));
        }
        lines.push(format!("   Content: {} chars", entry.content.chars().count()));
    }
    lines.push(String::new());
    lines
}
