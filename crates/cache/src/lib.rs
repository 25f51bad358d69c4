//! File-backed cache of prior research findings
//!
//! This crate keeps research artifacts (investigations, best-practice
//! write-ups, pattern analyses, comparisons) on disk so a research workflow
//! can reuse earlier findings instead of repeating the work:
//! - One Markdown file per entry, with YAML front matter for metadata
//! - Deterministic ids derived from topic and creation date
//! - Time-based expiry and codebase-hash invalidation
//! - Keyword search, listing and aggregate statistics
//!
//! # Overview
//!
//! ```text
//! <root>/
//!   investigations/   user-authentication-with-jwt-2025-01-15.md
//!   best-practices/
//!   patterns/
//!   comparisons/
//! ```
//!
//! Writers take a per-category exclusive lock and publish entries through an
//! atomic rename; readers never lock. Files that fail to decode are reported
//! as malformed and skipped by batch operations rather than aborting them.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use research_cache::{Category, NewEntry, QueryEngine, Store, StoreConfig};
//!
//! # fn main() -> research_cache::Result<()> {
//! # let temp = tempfile::TempDir::new().unwrap();
//! let store = Store::new(StoreConfig::new(temp.path()));
//! let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//!
//! let entry = NewEntry::new(Category::Investigation, "user authentication with JWT", "...")
//!     .tags(["auth", "jwt"])
//!     .into_entry(store.config().default_expiry_days, today)?;
//! store.add(&entry)?;
//!
//! let hits = QueryEngine::new(&store).search("jwt", today)?;
//! assert_eq!(hits.hits[0].entry.id, "user-authentication-with-jwt-2025-01-15");
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod config;
mod entry;
mod error;
pub mod identity;
pub mod invalidation;
mod maintenance;
mod query;
mod store;

// Re-export error types at crate root
pub use error::{Error, MalformedEntry, Result};

// Re-export main types
pub use codec::DecodeError;
pub use config::{CACHE_DIR_ENV, StoreConfig, resolve_root};
pub use entry::{
    CacheEntry, Category, DEFAULT_EXPIRY_DAYS, ENTRY_EXTENSION, EntryLocation, NewEntry,
    normalize_related_files, normalize_tags,
};
pub use identity::{make_id, slugify};
pub use invalidation::{Freshness, days_until_expiry, freshness, is_codebase_stale, is_expired, is_stale};
pub use maintenance::{ClearReport, ClearScope, Maintenance};
pub use query::{
    ListFilter, Listing, MatchedFields, QueryEngine, SearchHit, SearchResults, Stats, TOP_TAGS,
    TagCount,
};
pub use store::{Scan, ScannedEntry, Store};
