//! Read-side operations: list, search, show and stats.
//!
//! Every operation takes `today` explicitly so results are reproducible in
//! tests; front ends pass the local calendar date.

use crate::entry::{CacheEntry, Category};
use crate::invalidation::{Freshness, freshness, is_codebase_stale, is_expired};
use crate::store::{ScannedEntry, Store};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Number of tags reported by [`QueryEngine::stats`]
pub const TOP_TAGS: usize = 10;

/// Which entries [`QueryEngine::list`] returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Restrict to one category
    pub category: Option<Category>,
    /// Drop entries past their expiry date
    pub hide_expired: bool,
    /// Drop entries recorded against a different codebase hash
    pub current_hash: Option<String>,
}

/// Result of [`QueryEngine::list`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    /// Matching entries, newest first
    pub entries: Vec<CacheEntry>,
    /// Malformed entries that were skipped
    pub warnings: usize,
}

/// Which fields of an entry contained the search keyword
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchedFields {
    /// Keyword found in the topic
    pub topic: bool,
    /// Keyword found in at least one tag
    pub tags: bool,
    /// Keyword found in the body
    pub content: bool,
}

impl MatchedFields {
    /// Number of distinct fields that matched
    #[must_use]
    pub fn count(self) -> usize {
        usize::from(self.topic) + usize::from(self.tags) + usize::from(self.content)
    }

    /// Whether anything matched
    #[must_use]
    pub const fn any(self) -> bool {
        self.topic || self.tags || self.content
    }
}

/// One search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matching entry
    pub entry: CacheEntry,
    /// Where the keyword was found
    pub matched: MatchedFields,
    /// Expiry state on the day of the search
    pub freshness: Freshness,
}

/// Result of [`QueryEngine::search`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Hits, best first
    pub hits: Vec<SearchHit>,
    /// Malformed entries that were skipped
    pub warnings: usize,
}

/// Occurrences of one tag across the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// Normalized tag
    pub tag: String,
    /// Number of entries carrying it
    pub count: usize,
}

/// Aggregate view of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Decodable entries
    pub total: usize,
    /// Entries not yet expired
    pub active: usize,
    /// Entries past their expiry date
    pub expired: usize,
    /// Decodable entries per category (every category present, possibly zero)
    pub by_category: BTreeMap<Category, usize>,
    /// Most used tags, count descending then tag ascending
    pub top_tags: Vec<TagCount>,
    /// Entries per creation month (`YYYY-MM`)
    pub by_month: BTreeMap<String, usize>,
    /// Entry files that could not be decoded
    pub malformed: usize,
}

/// Read-only queries over a [`Store`]
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    store: &'a Store,
}

impl<'a> QueryEngine<'a> {
    /// Query the given store
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Entries matching `filter`, newest first (ties by id).
    ///
    /// # Errors
    ///
    /// Returns a directory-level [`Error::Io`] from the underlying scan.
    pub fn list(&self, filter: &ListFilter, today: NaiveDate) -> Result<Listing> {
        let (entries, warnings) = self.decoded(filter.category)?;
        let mut entries: Vec<CacheEntry> = entries
            .into_iter()
            .filter(|e| !filter.hide_expired || !is_expired(e, today))
            .filter(|e| {
                filter
                    .current_hash
                    .as_deref()
                    .is_none_or(|hash| !is_codebase_stale(e, hash))
            })
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(Listing { entries, warnings })
    }

    /// Case-insensitive substring search over topic, tags and content.
    ///
    /// The keyword is matched as given, surrounding whitespace included.
    /// Hits matching more fields rank first, then newer entries, then by id.
    /// An empty keyword matches every entry.
    ///
    /// # Errors
    ///
    /// Returns a directory-level [`Error::Io`] from the underlying scan.
    pub fn search(&self, keyword: &str, today: NaiveDate) -> Result<SearchResults> {
        let needle = keyword.to_lowercase();
        let (entries, warnings) = self.decoded(None)?;

        let mut hits: Vec<SearchHit> = entries
            .into_iter()
            .filter_map(|entry| {
                let matched = match_fields(&entry, &needle);
                matched.any().then(|| SearchHit {
                    freshness: freshness(&entry, today, None),
                    entry,
                    matched,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.matched
                .count()
                .cmp(&a.matched.count())
                .then_with(|| b.entry.created_at.cmp(&a.entry.created_at))
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        Ok(SearchResults { hits, warnings })
    }

    /// Load one entry.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] and [`Error::Malformed`] are kept distinct.
    pub fn show(&self, category: Category, id: &str) -> Result<CacheEntry> {
        self.store.get(category, id)
    }

    /// Load an entry by id alone, looking through categories in canonical order.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] (reported against the first category) when no
    /// category holds the id.
    pub fn show_by_id(&self, id: &str) -> Result<CacheEntry> {
        match self.store.find(id) {
            Some(category) => self.store.get(category, id),
            None => Err(Error::not_found(Category::ALL[0], id)),
        }
    }

    /// Counts by category, freshness, tag and creation month.
    ///
    /// # Errors
    ///
    /// Returns a directory-level [`Error::Io`] from the underlying scan.
    pub fn stats(&self, today: NaiveDate) -> Result<Stats> {
        let (entries, malformed) = self.decoded(None)?;

        let mut stats = Stats {
            total: entries.len(),
            malformed,
            by_category: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
            ..Stats::default()
        };
        let mut tag_counts: HashMap<&str, usize> = HashMap::new();

        for entry in &entries {
            if is_expired(entry, today) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
            *stats.by_category.entry(entry.category).or_default() += 1;
            *stats
                .by_month
                .entry(entry.created_at.format("%Y-%m").to_string())
                .or_default() += 1;
            for tag in &entry.tags {
                *tag_counts.entry(tag.as_str()).or_default() += 1;
            }
        }

        let mut top_tags: Vec<TagCount> = tag_counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        top_tags.sort_by_key(|t| (Reverse(t.count), t.tag.clone()));
        top_tags.truncate(TOP_TAGS);
        stats.top_tags = top_tags;

        Ok(stats)
    }

    /// Decodable entries plus the number of malformed ones
    fn decoded(&self, category: Option<Category>) -> Result<(Vec<CacheEntry>, usize)> {
        let mut entries = Vec::new();
        let mut malformed = 0;
        for scanned in self.store.scan(category) {
            let ScannedEntry { outcome, .. } = scanned?;
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(_) => malformed += 1,
            }
        }
        Ok((entries, malformed))
    }
}

fn match_fields(entry: &CacheEntry, needle: &str) -> MatchedFields {
    // Tags are already lowercase
    MatchedFields {
        topic: entry.topic.to_lowercase().contains(needle),
        tags: entry.tags.iter().any(|tag| tag.contains(needle)),
        content: entry.content.to_lowercase().contains(needle),
    }
}
