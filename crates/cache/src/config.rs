//! Store configuration and cache root resolution

use crate::entry::DEFAULT_EXPIRY_DAYS;
use crate::{Error, Result};
use dirs::{cache_dir, home_dir};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "RESEARCH_CACHE_DIR";

/// Directory name used under the platform cache locations
const APP_DIR: &str = "research-cache";

/// Everything a [`crate::Store`] needs to know about where and how to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one subdirectory per category
    pub root_dir: PathBuf,
    /// Expiry applied to entries that do not specify one
    pub default_expiry_days: u32,
}

impl StoreConfig {
    /// Configuration rooted at `root_dir` with the default 30-day expiry
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            default_expiry_days: DEFAULT_EXPIRY_DAYS,
        }
    }

    /// Override the default expiry
    #[must_use]
    pub const fn with_default_expiry_days(mut self, days: u32) -> Self {
        self.default_expiry_days = days;
        self
    }

    /// Configuration rooted at the first usable location from the environment.
    ///
    /// See [`resolve_root`] for the resolution order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no candidate is usable.
    pub fn resolve() -> Result<Self> {
        Ok(Self::new(resolve_root()?))
    }
}

/// Inputs for determining the cache root directory
#[derive(Debug, Clone)]
struct RootInputs {
    override_dir: Option<PathBuf>,
    xdg_cache_home: Option<PathBuf>,
    os_cache_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    temp_dir: PathBuf,
}

/// Candidate roots in priority order, with the Nix build sandbox's fake home filtered out
fn root_candidates(inputs: RootInputs) -> impl Iterator<Item = PathBuf> {
    let RootInputs {
        override_dir,
        xdg_cache_home,
        os_cache_dir,
        home_dir,
        temp_dir,
    } = inputs;

    override_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .into_iter()
        .chain(xdg_cache_home.map(|dir| dir.join(APP_DIR)))
        .chain(os_cache_dir.map(|dir| dir.join(APP_DIR)))
        .chain(home_dir.map(|dir| dir.join(format!(".{APP_DIR}"))))
        .chain(std::iter::once(temp_dir.join(APP_DIR)))
        .filter(|dir| !dir.starts_with("/homeless-shelter"))
}

/// Create `dir` if needed and confirm a file can be written inside it.
///
/// Existing directories are probed too: CI images often mount `$HOME` read-only.
fn writable_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join(".write_probe");
    fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)?;
    if let Err(e) = fs::remove_file(&probe) {
        debug!(path = %probe.display(), error = %e, "Could not remove write probe");
    }
    Ok(())
}

fn root_from_inputs(inputs: RootInputs) -> Result<PathBuf> {
    root_candidates(inputs)
        .find(|dir| match writable_dir(dir) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "Skipping unusable cache root");
                false
            }
        })
        .ok_or_else(|| Error::configuration("Failed to determine a writable cache directory"))
}

/// Resolve the cache root from the environment.
///
/// Order: `RESEARCH_CACHE_DIR`, `$XDG_CACHE_HOME/research-cache`, the OS cache
/// directory, `~/.research-cache`, then the temp directory. The first candidate
/// that exists and is writable, or can be created, wins.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when no candidate is usable.
pub fn resolve_root() -> Result<PathBuf> {
    let inputs = RootInputs {
        override_dir: non_empty_env(CACHE_DIR_ENV),
        xdg_cache_home: non_empty_env("XDG_CACHE_HOME"),
        os_cache_dir: cache_dir(),
        home_dir: home_dir(),
        temp_dir: std::env::temp_dir(),
    };
    root_from_inputs(inputs)
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}
