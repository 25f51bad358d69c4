use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use research_cache::{Category, ClearScope, DEFAULT_EXPIRY_DAYS};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Requested entry does not exist
pub const EXIT_NOT_FOUND: i32 = 1;
/// Destructive operation needs `--yes`
pub const EXIT_CONFIRMATION: i32 = 2;
/// Command completed but skipped malformed entries
pub const EXIT_WARNINGS: i32 = 3;
/// Any other failure
pub const EXIT_FAILURE: i32 = 4;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Entry not found (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(rcache::not_found))]
    NotFound {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Confirmation missing for a destructive operation (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(rcache::confirmation_required))]
    ConfirmationRequired {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Invalid input or configuration (exit code 4)
    #[error("Invalid input: {message}")]
    #[diagnostic(code(rcache::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 4)
    #[error("{message}")]
    #[diagnostic(code(rcache::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new not-found error
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            help: Some("Run `rcache list` to see the ids currently in the cache".to_string()),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Short machine-readable code used in JSON error envelopes
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::ConfirmationRequired { .. } => "confirmation_required",
            Self::Config { .. } => "config",
            Self::Other { .. } => "other",
        }
    }
}

/// Convert `research_cache::Error` to the appropriate `CliError` variant.
///
/// - Missing entries -> `NotFound` (exit code 1)
/// - Unconfirmed `clear --all` -> `ConfirmationRequired` (exit code 2)
/// - Bad ids, dates and configuration -> `Config` (exit code 4)
/// - I/O, malformed files and serialization -> `Other` (exit code 4)
impl From<research_cache::Error> for CliError {
    fn from(err: research_cache::Error) -> Self {
        use research_cache::Error;

        match err {
            Error::NotFound { .. } => Self::not_found(err.to_string()),
            Error::ConfirmationRequired => Self::ConfirmationRequired {
                message: err.to_string(),
                help: Some("Re-run with `--yes` to confirm".to_string()),
            },
            // Extract just the message to avoid a doubled prefix
            Error::Configuration { message } => Self::config(message),
            Error::InvalidExpiry { .. } => Self::config_with_help(
                err.to_string(),
                "Choose an expiry on or after the creation date",
            ),
            Error::InvalidId { .. } => Self::config(err.to_string()),
            Error::Malformed(malformed) => Self::other_with_help(
                malformed.to_string(),
                format!(
                    "Fix the front matter by hand, or remove it with `rcache invalidate {}`",
                    malformed.location.id
                ),
            ),
            Error::Io {
                source,
                path,
                operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::other_with_help(
                    format!("I/O {operation} failed{path_str}: {source}"),
                    "Check file permissions and ensure the path exists",
                )
            }
            Error::Serialization { .. } => Self::other(err.to_string()),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::NotFound { .. } => EXIT_NOT_FOUND,
        CliError::ConfirmationRequired { .. } => EXIT_CONFIRMATION,
        CliError::Config { .. } | CliError::Other { .. } => EXIT_FAILURE,
    }
}

/// Exit code for a failed argument parse.
///
/// `--help` and `--version` surface as clap errors too and exit cleanly; real
/// usage errors map to [`EXIT_FAILURE`] so they never read as [`EXIT_CONFIRMATION`].
#[must_use]
pub fn exit_code_for_parse_error(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        // Use miette for human-friendly error display
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        // Ensure output is flushed before potential process exit
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Manage the research cache: reuse prior findings instead of repeating research.
#[derive(Parser, Debug)]
#[command(name = "rcache")]
#[command(about = "Manage a file-backed cache of research findings")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Cache root directory.
    #[arg(
        long,
        global = true,
        env = "RESEARCH_CACHE_DIR",
        help = "Cache root directory (defaults to the platform cache directory)"
    )]
    pub cache_dir: Option<PathBuf>,

    /// Days until new entries expire.
    #[arg(
        long,
        global = true,
        env = "RESEARCH_CACHE_EXPIRY_DAYS",
        default_value_t = DEFAULT_EXPIRY_DAYS,
        help = "Days until new entries expire"
    )]
    pub expiry_days: u32,

    /// Logging level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Emit JSON envelopes instead of text.
    #[arg(long, global = true, help = "Emit JSON envelopes instead of text")]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cache entries, newest first.
    #[command(about = "List cache entries, newest first")]
    List {
        /// Only list this category.
        #[arg(help = "Only list this category", value_parser = parse_category)]
        category: Option<Category>,
        /// Hide expired entries.
        #[arg(long, help = "Hide expired entries")]
        hide_expired: bool,
        /// Hide entries recorded against a different codebase hash.
        #[arg(long, help = "Hide entries recorded against a different codebase hash")]
        codebase_hash: Option<String>,
        /// Show detailed info.
        #[arg(short, long, help = "Show detailed info")]
        verbose: bool,
    },
    /// Search topics, tags and content.
    #[command(about = "Search topics, tags and content")]
    Search {
        /// Case-insensitive keyword.
        #[arg(help = "Case-insensitive keyword")]
        keyword: String,
        /// Show detailed info.
        #[arg(short, long, help = "Show detailed info")]
        verbose: bool,
    },
    /// Show a cache entry in full.
    #[command(about = "Show a cache entry in full")]
    Show {
        /// Cache entry id.
        #[arg(help = "Cache entry id")]
        id: String,
        /// Category holding the entry.
        #[arg(long, help = "Category holding the entry", value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Add a research finding to the cache.
    #[command(about = "Add a research finding to the cache")]
    Add(AddArgs),
    /// Remove a single cache entry.
    #[command(about = "Remove a single cache entry")]
    Invalidate {
        /// Cache entry id.
        #[arg(help = "Cache entry id")]
        id: String,
        /// Category holding the entry.
        #[arg(long, help = "Category holding the entry", value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Remove cache entries in bulk.
    #[command(about = "Remove cache entries in bulk")]
    Clear(ClearArgs),
    /// Show cache statistics.
    #[command(about = "Show cache statistics")]
    Stats {
        /// Number of tags to show.
        #[arg(long, default_value_t = 5, help = "Number of tags to show")]
        top: usize,
    },
    /// Print the id an add would produce.
    #[command(about = "Print the id an add would produce")]
    Id {
        /// Research topic.
        #[arg(help = "Research topic")]
        topic: String,
        /// Creation date.
        #[arg(long, help = "Creation date (YYYY-MM-DD, defaults to today)", value_parser = parse_date)]
        date: Option<chrono::NaiveDate>,
    },
}

impl Commands {
    /// Command name for spans and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Search { .. } => "search",
            Self::Show { .. } => "show",
            Self::Add(_) => "add",
            Self::Invalidate { .. } => "invalidate",
            Self::Clear(_) => "clear",
            Self::Stats { .. } => "stats",
            Self::Id { .. } => "id",
        }
    }
}

/// Arguments for `rcache add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Category of the finding.
    #[arg(help = "Category of the finding", value_parser = parse_category)]
    pub category: Category,
    /// Research topic.
    #[arg(help = "Research topic")]
    pub topic: String,
    /// Content source: a file path, or `-` for stdin.
    #[arg(help = "File with the research content, or - for stdin")]
    pub content: PathBuf,
    /// Tags.
    #[arg(long, value_delimiter = ',', help = "Comma-separated tags")]
    pub tags: Vec<String>,
    /// Related file paths.
    #[arg(long, value_delimiter = ',', help = "Comma-separated related file paths")]
    pub related_files: Vec<String>,
    /// Source-tree fingerprint.
    #[arg(long, help = "Source-tree fingerprint the research was done against")]
    pub codebase_hash: Option<String>,
    /// Explicit expiry date.
    #[arg(long, help = "Expiry date (YYYY-MM-DD)", value_parser = parse_date)]
    pub expiry: Option<chrono::NaiveDate>,
    /// Creation date override.
    #[arg(long, help = "Creation date (YYYY-MM-DD, defaults to today)", value_parser = parse_date)]
    pub date: Option<chrono::NaiveDate>,
}

/// Arguments for `rcache clear`. Exactly one scope flag is required.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Clear expired entries only.
    #[arg(
        long,
        help = "Clear expired entries only",
        conflicts_with_all = ["category", "all"],
        required_unless_present_any = ["category", "all"]
    )]
    pub expired: bool,
    /// Clear every entry in a category.
    #[arg(
        long,
        help = "Clear every entry in a category",
        value_parser = parse_category,
        conflicts_with = "all"
    )]
    pub category: Option<Category>,
    /// Clear every entry.
    #[arg(long, help = "Clear every entry")]
    pub all: bool,
    /// Confirm `--all`.
    #[arg(long, short = 'y', help = "Confirm clearing every entry")]
    pub yes: bool,
}

impl ClearArgs {
    /// The scope selected by the mutually exclusive flags
    #[must_use]
    pub const fn scope(&self) -> ClearScope {
        if self.all {
            ClearScope::All
        } else if let Some(category) = self.category {
            ClearScope::Category(category)
        } else {
            ClearScope::Expired
        }
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
