//! Cache entry model: categories, entries and the add-time builder

use crate::identity::make_id;
use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of days before an entry expires
pub const DEFAULT_EXPIRY_DAYS: u32 = 30;

/// File extension of entry files inside a category directory
pub const ENTRY_EXTENSION: &str = "md";

/// Bucket an entry belongs to. Determines its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Investigations of how something works in a codebase
    Investigation,
    /// Best-practice write-ups
    BestPractice,
    /// Pattern analyses
    Pattern,
    /// Comparisons between alternatives
    Comparison,
}

impl Category {
    /// Every category, in canonical order
    pub const ALL: [Self; 4] = [
        Self::Investigation,
        Self::BestPractice,
        Self::Pattern,
        Self::Comparison,
    ];

    /// Directory name under the cache root
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Investigation => "investigations",
            Self::BestPractice => "best-practices",
            Self::Pattern => "patterns",
            Self::Comparison => "comparisons",
        }
    }

    /// Value written to the `research_type` metadata key
    #[must_use]
    pub const fn research_type(self) -> &'static str {
        match self {
            Self::Investigation => "investigation",
            Self::BestPractice => "best-practice",
            Self::Pattern => "pattern",
            Self::Comparison => "comparison",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts the directory name or the research type, in any case
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.dir_name() == needle || c.research_type() == needle)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Unknown category '{s}'. Expected one of: {}",
                    Self::ALL.map(Self::dir_name).join(", ")
                ))
            })
    }
}

/// Where an entry lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryLocation {
    /// Category directory holding the entry
    pub category: Category,
    /// Entry id (file stem)
    pub id: String,
    /// Full path of the entry file
    pub path: PathBuf,
}

/// One cached research artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// Bucket the entry belongs to
    pub category: Category,
    /// Id, unique within the category
    pub id: String,
    /// What was researched
    pub topic: String,
    /// Day the entry was produced
    pub created_at: NaiveDate,
    /// Day after which the entry is stale
    pub expires_at: NaiveDate,
    /// Source-tree fingerprint at research time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codebase_hash: Option<String>,
    /// Normalized tags (lowercase, unique, non-empty)
    pub tags: Vec<String>,
    /// Paths recorded for change-tracking context
    pub related_files: Vec<String>,
    /// Research write-up, stored verbatim
    pub content: String,
    /// Metadata keys this version does not interpret
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl CacheEntry {
    /// File name of the entry inside its category directory
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{ENTRY_EXTENSION}", self.id)
    }

    /// Copy with the stored-form invariants applied: trimmed topic, normalized
    /// tags and related files, blank codebase hash dropped.
    ///
    /// Decoding a stored entry always yields this form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the topic is blank.
    pub fn normalized(&self) -> Result<Self> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(Error::configuration("Topic must not be empty"));
        }
        Ok(Self {
            topic: topic.to_string(),
            codebase_hash: self
                .codebase_hash
                .as_deref()
                .map(str::trim)
                .filter(|hash| !hash.is_empty())
                .map(str::to_string),
            tags: normalize_tags(&self.tags),
            related_files: normalize_related_files(&self.related_files),
            ..self.clone()
        })
    }
}

/// Normalize tags: trim, lowercase, drop empties, drop case-insensitive duplicates.
///
/// First occurrence wins, so the caller's ordering is kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Trim related file paths and drop blank ones, keeping order.
pub fn normalize_related_files<I, S>(files: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    files
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Caller-supplied data for a new entry.
///
/// ```
/// use chrono::NaiveDate;
/// use research_cache::{Category, NewEntry};
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// let entry = NewEntry::new(Category::Investigation, "user authentication with JWT", "notes")
///     .tags(["auth", "JWT", "auth"])
///     .into_entry(30, day)
///     .unwrap();
/// assert_eq!(entry.id, "user-authentication-with-jwt-2025-01-15");
/// assert_eq!(entry.tags, vec!["auth", "jwt"]);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct NewEntry {
    category: Category,
    topic: String,
    content: String,
    created_at: Option<NaiveDate>,
    expires_at: Option<NaiveDate>,
    codebase_hash: Option<String>,
    tags: Vec<String>,
    related_files: Vec<String>,
}

impl NewEntry {
    /// Start a new entry with its required fields
    pub fn new(category: Category, topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            category,
            topic: topic.into(),
            content: content.into(),
            created_at: None,
            expires_at: None,
            codebase_hash: None,
            tags: Vec::new(),
            related_files: Vec::new(),
        }
    }

    /// Override the creation date (defaults to the date passed to [`Self::into_entry`])
    pub const fn created_on(mut self, date: NaiveDate) -> Self {
        self.created_at = Some(date);
        self
    }

    /// Set an explicit expiry date
    pub const fn expires_on(mut self, date: NaiveDate) -> Self {
        self.expires_at = Some(date);
        self
    }

    /// Record the source-tree fingerprint the research was done against
    pub fn codebase_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.codebase_hash = (!hash.trim().is_empty()).then(|| hash.trim().to_string());
        self
    }

    /// Set the tags
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    /// Set the related files
    pub fn related_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.related_files = files.into_iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Build the entry: derive the id, normalize tags and apply the default expiry.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] when the topic is blank or the expiry overflows the calendar
    /// - [`Error::InvalidExpiry`] when the expiry precedes the creation date
    pub fn into_entry(self, default_expiry_days: u32, today: NaiveDate) -> Result<CacheEntry> {
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            return Err(Error::configuration("Topic must not be empty"));
        }

        let created_at = self.created_at.unwrap_or(today);
        let expires_at = match self.expires_at {
            Some(date) => date,
            None => default_expiry(created_at, default_expiry_days)?,
        };
        if expires_at < created_at {
            return Err(Error::InvalidExpiry {
                created_at,
                expires_at,
            });
        }

        Ok(CacheEntry {
            category: self.category,
            id: make_id(&topic, created_at),
            topic,
            created_at,
            expires_at,
            codebase_hash: self.codebase_hash,
            tags: normalize_tags(&self.tags),
            related_files: normalize_related_files(&self.related_files),
            content: self.content,
            extra: BTreeMap::new(),
        })
    }
}

/// `created_at + days`
pub(crate) fn default_expiry(created_at: NaiveDate, days: u32) -> Result<NaiveDate> {
    created_at
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| Error::configuration(format!("Expiry of {days} days overflows the calendar")))
}
