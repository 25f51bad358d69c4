//! Error types for the research cache

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::codec::DecodeError;
use crate::entry::{Category, EntryLocation};
use chrono::NaiveDate;
use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// An entry file that exists on disk but cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("Malformed cache entry {}: {reason}", location.path.display())]
#[diagnostic(
    code(research_cache::malformed),
    help("Fix the front matter by hand, or remove the entry with `invalidate`")
)]
pub struct MalformedEntry {
    /// Where the entry lives
    pub location: EntryLocation,
    /// Why decoding failed
    pub reason: DecodeError,
}

/// Error type for research cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during cache operations
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(research_cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "rename", "lock_exclusive")
        operation: String,
    },

    /// Requested entry does not exist
    #[error("Cache entry not found: {category}/{id}")]
    #[diagnostic(
        code(research_cache::not_found),
        help("Run `list` to see the ids currently in the cache")
    )]
    NotFound {
        /// Category that was searched
        category: Category,
        /// The id that was not found
        id: String,
    },

    /// Entry exists but could not be decoded
    #[error(transparent)]
    #[diagnostic(transparent)]
    Malformed(#[from] MalformedEntry),

    /// Expiry date precedes creation date
    #[error("Expiry {expires_at} is before creation date {created_at}")]
    #[diagnostic(
        code(research_cache::invalid_expiry),
        help("Choose an expiry on or after the creation date")
    )]
    InvalidExpiry {
        /// Creation date of the rejected entry
        created_at: NaiveDate,
        /// Requested expiry date
        expires_at: NaiveDate,
    },

    /// Clearing everything was requested without confirmation
    #[error("Clearing every cache entry requires confirmation")]
    #[diagnostic(
        code(research_cache::confirmation_required),
        help("Re-run with `--yes` to confirm")
    )]
    ConfirmationRequired,

    /// Id cannot be used as a file name inside a category directory
    #[error("Invalid cache id '{id}': {reason}")]
    #[diagnostic(code(research_cache::invalid_id))]
    InvalidId {
        /// The rejected id
        id: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Configuration or validation error
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(research_cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(code(research_cache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(category: Category, id: impl Into<String>) -> Self {
        Self::NotFound {
            category,
            id: id.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Whether this error means the entry is simply absent
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for research cache operations
pub type Result<T> = std::result::Result<T, Error>;
