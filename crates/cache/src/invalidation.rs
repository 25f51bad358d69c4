//! Staleness predicates.
//!
//! Pure functions of an entry and the caller's context. Policy (what counts as
//! "usable") belongs to the caller; these only answer the two questions.

use crate::entry::CacheEntry;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// `now > expires_at`. An entry is still valid on its expiry day.
#[must_use]
pub fn is_expired(entry: &CacheEntry, now: NaiveDate) -> bool {
    now > entry.expires_at
}

/// The entry recorded a codebase hash and it differs from `current_hash`.
///
/// Entries without a recorded hash are never codebase-stale.
#[must_use]
pub fn is_codebase_stale(entry: &CacheEntry, current_hash: &str) -> bool {
    entry
        .codebase_hash
        .as_deref()
        .is_some_and(|recorded| recorded != current_hash)
}

/// Expired or codebase-stale
#[must_use]
pub fn is_stale(entry: &CacheEntry, now: NaiveDate, current_hash: &str) -> bool {
    is_expired(entry, now) || is_codebase_stale(entry, current_hash)
}

/// Days left until expiry; zero on the expiry day, negative once expired.
#[must_use]
pub fn days_until_expiry(entry: &CacheEntry, now: NaiveDate) -> i64 {
    entry.expires_at.signed_duration_since(now).num_days()
}

/// Combined staleness state, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Freshness {
    /// Neither expired nor codebase-stale
    Fresh,
    /// Past its expiry date
    Expired,
    /// Recorded codebase hash no longer matches
    CodebaseStale,
    /// Both of the above
    ExpiredAndStale,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fresh => "fresh",
            Self::Expired => "expired",
            Self::CodebaseStale => "stale",
            Self::ExpiredAndStale => "expired, stale",
        })
    }
}

/// Classify an entry. Without a current hash only expiry is considered.
#[must_use]
pub fn freshness(entry: &CacheEntry, now: NaiveDate, current_hash: Option<&str>) -> Freshness {
    let expired = is_expired(entry, now);
    let stale = current_hash.is_some_and(|h| is_codebase_stale(entry, h));
    match (expired, stale) {
        (false, false) => Freshness::Fresh,
        (true, false) => Freshness::Expired,
        (false, true) => Freshness::CodebaseStale,
        (true, true) => Freshness::ExpiredAndStale,
    }
}
