//! Write-side housekeeping: invalidate single entries and clear in bulk.

use crate::entry::Category;
use crate::invalidation::is_expired;
use crate::store::Store;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What [`Maintenance::clear`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Decodable entries past their expiry date, in every category
    Expired,
    /// Every entry file in one category
    Category(Category),
    /// Every entry file in every category; requires confirmation
    All,
}

/// Outcome of a clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Entry files deleted
    pub removed: usize,
    /// Malformed entries left in place
    pub warnings: usize,
}

/// Destructive operations over a [`Store`]
#[derive(Debug, Clone, Copy)]
pub struct Maintenance<'a> {
    store: &'a Store,
}

impl<'a> Maintenance<'a> {
    /// Maintain the given store
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Remove one entry. Returns `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] or [`Error::Io`].
    pub fn invalidate(&self, category: Category, id: &str) -> Result<bool> {
        let removed = self.store.delete(category, id)?;
        if removed {
            info!(%category, id, "Invalidated cache entry");
        }
        Ok(removed)
    }

    /// Remove an entry found by id alone. Returns `false` when no category holds it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] or [`Error::Io`].
    pub fn invalidate_by_id(&self, id: &str) -> Result<bool> {
        match self.store.find(id) {
            Some(category) => self.invalidate(category, id),
            None => Ok(false),
        }
    }

    /// Bulk removal.
    ///
    /// # Errors
    ///
    /// - [`Error::ConfirmationRequired`] for [`ClearScope::All`] without `confirmed`;
    ///   nothing is deleted
    /// - [`Error::Io`] from scanning or deleting
    pub fn clear(&self, scope: ClearScope, confirmed: bool, today: NaiveDate) -> Result<ClearReport> {
        let report = match scope {
            ClearScope::Expired => self.clear_expired(today)?,
            ClearScope::Category(category) => self.clear_categories(&[category])?,
            ClearScope::All if !confirmed => return Err(Error::ConfirmationRequired),
            ClearScope::All => self.clear_categories(&Category::ALL)?,
        };
        info!(
            ?scope,
            removed = report.removed,
            warnings = report.warnings,
            "Cleared cache entries"
        );
        Ok(report)
    }

    /// Candidates come from an unlocked scan; expiry is re-checked under each category lock
    fn clear_expired(&self, today: NaiveDate) -> Result<ClearReport> {
        let mut expired: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        let mut warnings = 0;

        for scanned in self.store.scan_all() {
            let scanned = scanned?;
            match scanned.outcome {
                Ok(entry) if is_expired(&entry, today) => {
                    expired.entry(entry.category).or_default().push(entry.id);
                }
                Ok(_) => {}
                Err(malformed) => {
                    warn!(
                        path = %malformed.location.path.display(),
                        "Leaving malformed entry in place"
                    );
                    warnings += 1;
                }
            }
        }

        let mut removed = 0;
        for (category, ids) in expired {
            removed += self
                .store
                .delete_if(category, &ids, |entry| is_expired(entry, today))?;
        }
        Ok(ClearReport { removed, warnings })
    }

    /// Delete every entry file, decodable or not
    fn clear_categories(&self, categories: &[Category]) -> Result<ClearReport> {
        let mut removed = 0;
        for &category in categories {
            let ids: Vec<String> = self
                .store
                .scan(Some(category))
                .map(|scanned| scanned.map(|s| s.location.id))
                .collect::<Result<_>>()?;
            removed += self.store.delete_many(category, &ids)?;
        }
        Ok(ClearReport {
            removed,
            warnings: 0,
        })
    }
}
