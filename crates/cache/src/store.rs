//! Directory-backed entry persistence.
//!
//! Layout: `<root>/<category-dir>/<id>.md`. Writers hold an exclusive lock on
//! `<category-dir>/.lock` for the duration of a single operation and publish
//! files with write-to-temp + rename, so readers never take a lock and never
//! observe a torn file.

use crate::codec::{self, DecodeError};
use crate::config::StoreConfig;
use crate::entry::{CacheEntry, Category, ENTRY_EXTENSION, EntryLocation};
use crate::error::MalformedEntry;
use crate::{Error, Result};
use fs4::fs_std::FileExt;
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LOCK_FILE: &str = ".lock";

/// One file found by a [`Scan`]
#[derive(Debug, Clone)]
pub struct ScannedEntry {
    /// Where the file lives
    pub location: EntryLocation,
    /// The decoded entry, or why it could not be decoded
    pub outcome: std::result::Result<CacheEntry, MalformedEntry>,
}

/// Persistent entry store rooted at [`StoreConfig::root_dir`]
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Open a store. Directories are created lazily on first write.
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root_dir
    }

    /// Configuration the store was opened with
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Directory holding every entry of `category`
    #[must_use]
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.config.root_dir.join(category.dir_name())
    }

    /// Path of the entry file for `(category, id)`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] when the id is not a plain file stem.
    pub fn entry_path(&self, category: Category, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self
            .category_dir(category)
            .join(format!("{id}.{ENTRY_EXTENSION}")))
    }

    /// Persist an entry, replacing any existing entry with the same `(category, id)`.
    ///
    /// The entry is stored in its [`CacheEntry::normalized`] form, which is
    /// what [`Store::get`] returns afterwards. Returns the entry id.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidExpiry`] when `expires_at < created_at`; nothing is written
    /// - [`Error::Configuration`] when the topic is blank; nothing is written
    /// - [`Error::InvalidId`] when the id is not a plain file stem
    /// - [`Error::Io`] on filesystem failures
    pub fn add(&self, entry: &CacheEntry) -> Result<String> {
        if entry.expires_at < entry.created_at {
            return Err(Error::InvalidExpiry {
                created_at: entry.created_at,
                expires_at: entry.expires_at,
            });
        }
        let path = self.entry_path(entry.category, &entry.id)?;
        let entry = &entry.normalized()?;
        let contents = codec::encode(entry)?;

        let dir = self.category_dir(entry.category);
        fs::create_dir_all(&dir).map_err(|e| Error::io(e, &dir, "create_dir_all"))?;

        let _lock = self.lock(entry.category)?;

        // Dot-prefixed so scans never pick up a half-written file
        let temp_path = dir.join(format!(".{}.tmp", entry.file_name()));
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(e, &temp_path, "open"))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| Error::io(e, &temp_path, "write_all"))?;
        file.sync_all()
            .map_err(|e| Error::io(e, &temp_path, "sync_all"))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(e, &path, "rename"));
        }

        debug!(
            category = %entry.category,
            id = %entry.id,
            path = %path.display(),
            "Stored cache entry"
        );
        Ok(entry.id.clone())
    }

    /// Load one entry.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when no file exists
    /// - [`Error::Malformed`] when the file cannot be decoded
    pub fn get(&self, category: Category, id: &str) -> Result<CacheEntry> {
        let path = self.entry_path(category, id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::not_found(category, id));
            }
            Err(e) => return Err(Error::io(e, &path, "read")),
        };
        let location = EntryLocation {
            category,
            id: id.to_string(),
            path,
        };
        codec::decode(category, id, &text, self.config.default_expiry_days)
            .map_err(|reason| MalformedEntry { location, reason }.into())
    }

    /// Whether an entry file exists for `(category, id)`
    #[must_use]
    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.entry_path(category, id)
            .is_ok_and(|path| path.is_file())
    }

    /// First category, in canonical order, holding an entry with this id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.contains(*category, id))
    }

    /// Remove one entry. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] or [`Error::Io`].
    pub fn delete(&self, category: Category, id: &str) -> Result<bool> {
        let path = self.entry_path(category, id)?;
        if !self.category_dir(category).is_dir() {
            return Ok(false);
        }
        let _lock = self.lock(category)?;
        remove_entry_file(&path)
    }

    /// Remove several entries of one category under a single lock.
    ///
    /// Returns how many files were actually removed; absent ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] before deleting anything if any id is invalid,
    /// or [`Error::Io`] on the first failed removal.
    pub fn delete_many<I, S>(&self, category: Category, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = ids
            .into_iter()
            .map(|id| self.entry_path(category, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if paths.is_empty() || !self.category_dir(category).is_dir() {
            return Ok(0);
        }

        let _lock = self.lock(category)?;
        let mut removed = 0;
        for path in &paths {
            if remove_entry_file(path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove the entries of one category that still satisfy `predicate`.
    ///
    /// Each candidate is re-read under the category lock, so an entry replaced
    /// by a concurrent [`Store::add`] is judged on its new contents. Absent and
    /// malformed entries are skipped. Returns how many files were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] before deleting anything if any id is invalid,
    /// or [`Error::Io`] on the first failed read or removal.
    pub fn delete_if<I, S, F>(&self, category: Category, ids: I, mut predicate: F) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&CacheEntry) -> bool,
    {
        let ids = ids
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                validate_id(id).map(|()| id.to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        if ids.is_empty() || !self.category_dir(category).is_dir() {
            return Ok(0);
        }

        let _lock = self.lock(category)?;
        let mut removed = 0;
        for id in &ids {
            let entry = match self.get(category, id) {
                Ok(entry) => entry,
                Err(Error::NotFound { .. } | Error::Malformed(_)) => continue,
                Err(e) => return Err(e),
            };
            if !predicate(&entry) {
                debug!(%category, id = %id, "Entry changed since it was selected; keeping it");
                continue;
            }
            if remove_entry_file(&self.entry_path(category, id)?)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Locations of stored entries, oldest first.
    ///
    /// Ordered by creation date then id; files that fail to decode come last,
    /// ordered by id.
    ///
    /// # Errors
    ///
    /// Returns the first directory-level [`Error::Io`] encountered.
    pub fn list_ids(&self, category: Option<Category>) -> Result<Vec<EntryLocation>> {
        let mut decoded = Vec::new();
        let mut malformed = Vec::new();
        for scanned in self.scan(category) {
            let scanned = scanned?;
            match scanned.outcome {
                Ok(entry) => decoded.push((entry.created_at, scanned.location)),
                Err(_) => malformed.push(scanned.location),
            }
        }
        decoded.sort_by(|(a_date, a), (b_date, b)| a_date.cmp(b_date).then_with(|| a.id.cmp(&b.id)));
        malformed.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(decoded
            .into_iter()
            .map(|(_, location)| location)
            .chain(malformed)
            .collect())
    }

    /// Lazily walk the entries of one category, or of every category.
    #[must_use]
    pub fn scan(&self, category: Option<Category>) -> Scan {
        let categories = category.map_or_else(|| Category::ALL.to_vec(), |c| vec![c]);
        Scan {
            root: self.config.root_dir.clone(),
            default_expiry_days: self.config.default_expiry_days,
            categories: categories.into(),
            current: None,
        }
    }

    /// Lazily walk every category in canonical order
    #[must_use]
    pub fn scan_all(&self) -> Scan {
        self.scan(None)
    }

    fn lock(&self, category: Category) -> Result<CategoryLock> {
        CategoryLock::acquire(&self.category_dir(category).join(LOCK_FILE))
    }
}

/// Exclusive advisory lock on a category's lock file; released on drop.
struct CategoryLock {
    _file: File,
}

impl CategoryLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io(e, path, "open"))?;
        file.lock_exclusive()
            .map_err(|e| Error::io(e, path, "lock_exclusive"))?;
        debug!(path = %path.display(), "Acquired category lock");
        Ok(Self { _file: file })
    }
}

fn remove_entry_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed cache entry");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(e, path, "remove_file")),
    }
}

/// Reject ids that are not a plain file stem
fn validate_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        Some("id must not be empty")
    } else if id.contains(['/', '\\']) {
        Some("id must not contain path separators")
    } else if id.contains("..") {
        Some("id must not contain '..'")
    } else if id.starts_with('.') {
        Some("id must not start with '.'")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(Error::InvalidId {
            id: id.to_string(),
            reason,
        })
    })
}

/// Lazy iterator over stored entries, returned by [`Store::scan`].
///
/// Categories are visited in canonical order and files in file-name order.
/// A category directory that cannot be read yields one `Err` item and the
/// scan moves on to the next category.
#[derive(Debug)]
pub struct Scan {
    root: PathBuf,
    default_expiry_days: u32,
    categories: VecDeque<Category>,
    current: Option<(Category, std::vec::IntoIter<PathBuf>)>,
}

impl Scan {
    /// Collect the entry files of a category, sorted by name
    fn entry_files(&self, category: Category) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(category.dir_name());
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(e, &dir, "read_dir")),
        };

        let mut files = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| Error::io(e, &dir, "read_dir"))?;
            let path = dir_entry.path();
            if is_entry_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, category: Category, path: PathBuf) -> ScannedEntry {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let location = EntryLocation { category, id, path };

        let outcome = fs::read_to_string(&location.path)
            .map_err(|e| DecodeError::Unreadable(e.to_string()))
            .and_then(|text| {
                codec::decode(category, &location.id, &text, self.default_expiry_days)
            })
            .map_err(|reason| {
                warn!(
                    path = %location.path.display(),
                    %reason,
                    "Skipping malformed cache entry"
                );
                MalformedEntry {
                    location: location.clone(),
                    reason,
                }
            });

        ScannedEntry { location, outcome }
    }
}

impl Iterator for Scan {
    type Item = Result<ScannedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self
                .current
                .as_mut()
                .map(|(category, files)| (*category, files.next()));
            match next {
                Some((category, Some(path))) => return Some(Ok(self.load(category, path))),
                Some((_, None)) => self.current = None,
                None => {}
            }

            let category = self.categories.pop_front()?;
            match self.entry_files(category) {
                Ok(files) => self.current = Some((category, files.into_iter())),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn is_entry_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.starts_with('.'));
    visible
        && path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
        && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewEntry;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> (TempDir, Store) {
        let temp = TempDir::new().unwrap();
        let store = Store::new(StoreConfig::new(temp.path()));
        (temp, store)
    }

    fn entry(category: Category, topic: &str, created: NaiveDate) -> CacheEntry {
        NewEntry::new(category, topic, format!("notes on {topic}\n"))
            .tags(["rust"])
            .into_entry(30, created)
            .unwrap()
    }

    #[test]
    fn add_then_get_returns_entry() {
        let (_temp, store) = store();
        let e = entry(Category::Investigation, "user authentication with JWT", day(2025, 1, 15));
        let id = store.add(&e).unwrap();
        assert_eq!(id, "user-authentication-with-jwt-2025-01-15");
        assert_eq!(store.get(Category::Investigation, &id).unwrap(), e);
        assert!(
            store
                .root()
                .join("investigations/user-authentication-with-jwt-2025-01-15.md")
                .is_file()
        );
    }

    #[test]
    fn add_replaces_same_id() {
        let (_temp, store) = store();
        let mut e = entry(Category::Pattern, "repository pattern", day(2025, 1, 1));
        store.add(&e).unwrap();
        e.content = "second version".to_string();
        store.add(&e).unwrap();

        assert_eq!(store.get(Category::Pattern, &e.id).unwrap().content, "second version");
        let files: Vec<_> = fs::read_dir(store.category_dir(Category::Pattern))
            .unwrap()
            .filter_map(|d| d.ok())
            .filter(|d| is_entry_file(&d.path()))
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn add_rejects_invalid_expiry_without_writing() {
        let (_temp, store) = store();
        let mut e = entry(Category::Comparison, "a vs b", day(2025, 1, 10));
        e.expires_at = day(2025, 1, 9);
        assert!(matches!(store.add(&e), Err(Error::InvalidExpiry { .. })));
        assert!(!store.category_dir(Category::Comparison).exists());
    }

    #[test]
    fn add_stores_normalized_form() {
        let (_temp, store) = store();
        let mut e = entry(Category::Investigation, "caching", day(2025, 1, 1));
        e.topic = "  caching ".to_string();
        e.tags = vec!["Auth".into(), "auth".into(), String::new()];
        e.related_files = vec!["src/cache.rs ".into(), String::new()];
        e.codebase_hash = Some(String::new());

        store.add(&e).unwrap();
        let stored = store.get(Category::Investigation, &e.id).unwrap();
        assert_eq!(stored, e.normalized().unwrap());
        assert_eq!(stored.topic, "caching");
        assert_eq!(stored.tags, vec!["auth"]);
        assert_eq!(stored.related_files, vec!["src/cache.rs"]);
        assert_eq!(stored.codebase_hash, None);
        let text = codec::encode(&stored).unwrap();
        assert_eq!(codec::decode(stored.category, &stored.id, &text, 30).unwrap(), stored);
    }

    #[test]
    fn add_rejects_blank_topic_without_writing() {
        let (_temp, store) = store();
        let mut e = entry(Category::Pattern, "topic", day(2025, 1, 1));
        e.topic = "   ".to_string();
        assert!(matches!(store.add(&e), Err(Error::Configuration { .. })));
        assert!(!store.category_dir(Category::Pattern).exists());
    }

    #[test]
    fn delete_if_rechecks_current_contents() {
        let (_temp, store) = store();
        let old = entry(Category::Pattern, "retry", day(2024, 1, 1));
        store.add(&old).unwrap();
        let other = entry(Category::Pattern, "other", day(2024, 1, 1));
        store.add(&other).unwrap();
        let today = day(2025, 1, 1);

        // Selected as expired, then replaced with a fresh version before deletion
        let selected = vec![old.id.clone(), other.id.clone(), "missing".to_string()];
        let mut fresh = old.clone();
        fresh.expires_at = day(2025, 6, 1);
        store.add(&fresh).unwrap();

        let removed = store
            .delete_if(Category::Pattern, &selected, |e| e.expires_at < today)
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.get(Category::Pattern, &old.id).unwrap(), fresh);
        assert!(!store.contains(Category::Pattern, &other.id));
    }

    #[test]
    fn delete_if_skips_malformed_entries() {
        let (_temp, store) = store();
        store.add(&entry(Category::Pattern, "good", day(2025, 1, 1))).unwrap();
        fs::write(store.category_dir(Category::Pattern).join("bad.md"), "oops").unwrap();
        let removed = store
            .delete_if(Category::Pattern, ["bad", "good-2025-01-01"], |_| true)
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.category_dir(Category::Pattern).join("bad.md").exists());
    }

    #[test]
    fn add_leaves_no_temp_files() {
        let (_temp, store) = store();
        store
            .add(&entry(Category::Pattern, "builder", day(2025, 1, 1)))
            .unwrap();
        let names: Vec<String> = fs::read_dir(store.category_dir(Category::Pattern))
            .unwrap()
            .map(|d| d.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
    }

    #[test]
    fn get_distinguishes_missing_and_malformed() {
        let (_temp, store) = store();
        assert!(store.get(Category::Pattern, "nope").unwrap_err().is_not_found());

        let dir = store.category_dir(Category::Pattern);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.md"), "no front matter here").unwrap();
        match store.get(Category::Pattern, "broken") {
            Err(Error::Malformed(m)) => {
                assert_eq!(m.reason, DecodeError::MissingFrontMatter);
                assert_eq!(m.location.id, "broken");
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn ids_that_escape_the_category_are_rejected() {
        let (_temp, store) = store();
        for id in ["", "../secrets", "a/b", "a\\b", ".hidden", "x..y"] {
            assert!(
                matches!(store.get(Category::Pattern, id), Err(Error::InvalidId { .. })),
                "{id:?} should be rejected"
            );
        }
        assert!(!store.contains(Category::Pattern, "../x"));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_temp, store) = store();
        let e = entry(Category::BestPractice, "error handling", day(2025, 1, 1));
        store.add(&e).unwrap();
        assert!(store.delete(Category::BestPractice, &e.id).unwrap());
        assert!(!store.delete(Category::BestPractice, &e.id).unwrap());
        assert!(!store.delete(Category::Comparison, "never-existed").unwrap());
    }

    #[test]
    fn delete_many_counts_removed_files() {
        let (_temp, store) = store();
        let a = entry(Category::Pattern, "a", day(2025, 1, 1));
        let b = entry(Category::Pattern, "b", day(2025, 1, 1));
        store.add(&a).unwrap();
        store.add(&b).unwrap();
        let removed = store
            .delete_many(Category::Pattern, [a.id.as_str(), b.id.as_str(), "missing"])
            .unwrap();
        assert_eq!(removed, 2);
        assert!(store.list_ids(Some(Category::Pattern)).unwrap().is_empty());
    }

    #[test]
    fn find_returns_first_category_in_canonical_order() {
        let (_temp, store) = store();
        let mut e = entry(Category::Comparison, "shared", day(2025, 1, 1));
        store.add(&e).unwrap();
        assert_eq!(store.find(&e.id), Some(Category::Comparison));
        e.category = Category::Investigation;
        store.add(&e).unwrap();
        assert_eq!(store.find(&e.id), Some(Category::Investigation));
        assert_eq!(store.find("unknown"), None);
    }

    #[test]
    fn list_ids_orders_by_date_then_id_with_malformed_last() {
        let (_temp, store) = store();
        store.add(&entry(Category::Pattern, "zeta", day(2025, 1, 1))).unwrap();
        store.add(&entry(Category::Pattern, "alpha", day(2025, 2, 1))).unwrap();
        store.add(&entry(Category::Pattern, "beta", day(2025, 1, 1))).unwrap();
        let dir = store.category_dir(Category::Pattern);
        fs::write(dir.join("aaa-broken.md"), "---\ntopic: x\n").unwrap();

        let ids: Vec<String> = store
            .list_ids(Some(Category::Pattern))
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "beta-2025-01-01",
                "zeta-2025-01-01",
                "alpha-2025-02-01",
                "aaa-broken"
            ]
        );
    }

    #[test]
    fn scan_ignores_hidden_and_foreign_files() {
        let (_temp, store) = store();
        store.add(&entry(Category::Investigation, "kept", day(2025, 1, 1))).unwrap();
        let dir = store.category_dir(Category::Investigation);
        fs::write(dir.join(".kept-2025-01-01.md.tmp"), "partial").unwrap();
        fs::write(dir.join("README.txt"), "not an entry").unwrap();
        fs::create_dir(dir.join("nested.md")).unwrap();

        let scanned: Vec<_> = store.scan_all().collect::<Result<_>>().unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].location.id, "kept-2025-01-01");
        assert!(scanned[0].outcome.is_ok());
    }

    #[test]
    fn scan_reports_malformed_entries_with_reason() {
        let (_temp, store) = store();
        store.add(&entry(Category::Pattern, "good", day(2025, 1, 1))).unwrap();
        let dir = store.category_dir(Category::Pattern);
        fs::write(dir.join("bad.md"), "---\ndate: 2025-01-01\n---\n").unwrap();

        let scanned: Vec<_> = store
            .scan(Some(Category::Pattern))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(scanned.len(), 2);
        // File-name order: bad.md before good-2025-01-01.md
        let bad = scanned[0].outcome.as_ref().unwrap_err();
        assert_eq!(bad.reason, DecodeError::MissingField("topic"));
        assert!(scanned[1].outcome.is_ok());
    }

    #[test]
    fn scan_of_empty_store_is_empty() {
        let (_temp, store) = store();
        assert_eq!(store.scan_all().count(), 0);
        assert!(store.list_ids(None).unwrap().is_empty());
    }

    #[test]
    fn scan_all_visits_categories_in_canonical_order() {
        let (_temp, store) = store();
        store.add(&entry(Category::Comparison, "c", day(2025, 1, 1))).unwrap();
        store.add(&entry(Category::Investigation, "i", day(2025, 1, 1))).unwrap();
        store.add(&entry(Category::BestPractice, "b", day(2025, 1, 1))).unwrap();

        let categories: Vec<Category> = store
            .scan_all()
            .map(|s| s.unwrap().location.category)
            .collect();
        assert_eq!(
            categories,
            vec![
                Category::Investigation,
                Category::BestPractice,
                Category::Comparison
            ]
        );
    }
}
