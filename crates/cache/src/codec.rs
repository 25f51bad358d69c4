//! Entry codec: YAML front matter followed by the verbatim research body.
//!
//! ```text
//! ---
//! research_type: investigation
//! topic: user authentication with JWT
//! date: 2025-01-15
//! expiry: 2025-02-14
//! tags:
//! - auth
//! - jwt
//! related_files: []
//! ---
//!
//! <content>
//! ```
//!
//! Decoding is strict about required fields and lenient about list shapes:
//! tags and related files may be a YAML sequence, a comma-separated string,
//! or absent. Keys this version does not know are carried through untouched.

use crate::entry::{Category, CacheEntry, default_expiry, normalize_related_files, normalize_tags};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

const DELIMITER: &str = "---";

const KEY_RESEARCH_TYPE: &str = "research_type";
const KEY_TOPIC: &str = "topic";
const KEY_DATE: &str = "date";
const KEY_EXPIRY: &str = "expiry";
const KEY_CODEBASE_HASH: &str = "codebase_hash";
const KEY_TAGS: &str = "tags";
const KEY_RELATED_FILES: &str = "related_files";

const KNOWN_KEYS: [&str; 7] = [
    KEY_RESEARCH_TYPE,
    KEY_TOPIC,
    KEY_DATE,
    KEY_EXPIRY,
    KEY_CODEBASE_HASH,
    KEY_TAGS,
    KEY_RELATED_FILES,
];

/// Why an entry file could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No `---` delimited block at the top of the file
    #[error("missing front matter (expected a block delimited by '---' lines)")]
    MissingFrontMatter,

    /// Front matter is not a YAML mapping
    #[error("invalid YAML front matter: {0}")]
    InvalidYaml(String),

    /// A required key is absent or empty
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A key holds a structure where text was expected
    #[error("field '{0}' must be a plain value")]
    InvalidField(&'static str),

    /// A date key does not hold a parsable date
    #[error("invalid date in '{field}': {value}")]
    InvalidDate {
        /// Metadata key
        field: &'static str,
        /// Offending value as written
        value: String,
    },

    /// A list key contains nested structures
    #[error("field '{0}' must be a list of plain values")]
    InvalidList(&'static str),

    /// `expiry` precedes `date`
    #[error("expiry {expires_at} is before date {created_at}")]
    ExpiryBeforeCreation {
        /// Parsed `date`
        created_at: NaiveDate,
        /// Parsed `expiry`
        expires_at: NaiveDate,
    },

    /// The file could not be read at all
    #[error("unreadable: {0}")]
    Unreadable(String),
}

/// Render an entry to its on-disk text form.
///
/// # Errors
///
/// Returns [`Error::Serialization`] only if YAML emission itself fails, which
/// does not happen for the plain strings and lists an entry holds.
pub fn encode(entry: &CacheEntry) -> Result<String> {
    let mut meta = Mapping::new();
    meta.insert(
        KEY_RESEARCH_TYPE.into(),
        entry.category.research_type().into(),
    );
    meta.insert(KEY_TOPIC.into(), entry.topic.clone().into());
    meta.insert(KEY_DATE.into(), format_date(entry.created_at).into());
    meta.insert(KEY_EXPIRY.into(), format_date(entry.expires_at).into());
    if let Some(hash) = &entry.codebase_hash {
        meta.insert(KEY_CODEBASE_HASH.into(), hash.clone().into());
    }
    meta.insert(KEY_TAGS.into(), string_seq(&entry.tags));
    meta.insert(KEY_RELATED_FILES.into(), string_seq(&entry.related_files));
    for (key, value) in &entry.extra {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            meta.insert(key.clone().into(), value.clone());
        }
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(meta))
        .map_err(|e| Error::serialization(format!("Failed to encode front matter: {e}")))?;

    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}", entry.content))
}

/// Parse an entry file. `category` and `id` come from the file's location.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first problem found.
pub fn decode(
    category: Category,
    id: &str,
    text: &str,
    default_expiry_days: u32,
) -> std::result::Result<CacheEntry, DecodeError> {
    let (header, body) = split_front_matter(text)?;

    let mut meta = match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            return Err(DecodeError::InvalidYaml(
                "front matter must be a mapping".to_string(),
            ));
        }
        Err(e) => return Err(DecodeError::InvalidYaml(e.to_string())),
    };

    if let Some(research_type) = meta.remove(KEY_RESEARCH_TYPE).as_ref().and_then(scalar_text)
        && research_type.parse::<Category>().ok() != Some(category)
    {
        debug!(
            id,
            %category,
            %research_type,
            "research_type disagrees with entry location; using location"
        );
    }

    let topic = match meta.remove(KEY_TOPIC) {
        None | Some(Value::Null) => return Err(DecodeError::MissingField(KEY_TOPIC)),
        Some(value) => scalar_text(&value)
            .ok_or(DecodeError::InvalidField(KEY_TOPIC))?
            .trim()
            .to_string(),
    };
    if topic.is_empty() {
        return Err(DecodeError::MissingField(KEY_TOPIC));
    }

    let created_at = match meta.remove(KEY_DATE) {
        None | Some(Value::Null) => return Err(DecodeError::MissingField(KEY_DATE)),
        Some(value) => parse_date(KEY_DATE, &value)?,
    };

    let expires_at = match meta.remove(KEY_EXPIRY) {
        None | Some(Value::Null) => default_expiry(created_at, default_expiry_days).map_err(|_| {
            DecodeError::InvalidDate {
                field: KEY_EXPIRY,
                value: format!("{created_at} + {default_expiry_days} days"),
            }
        })?,
        Some(value) => parse_date(KEY_EXPIRY, &value)?,
    };
    if expires_at < created_at {
        return Err(DecodeError::ExpiryBeforeCreation {
            created_at,
            expires_at,
        });
    }

    let codebase_hash = match meta.remove(KEY_CODEBASE_HASH) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let hash = scalar_text(&value).ok_or(DecodeError::InvalidField(KEY_CODEBASE_HASH))?;
            let hash = hash.trim();
            (!hash.is_empty()).then(|| hash.to_string())
        }
    };

    let tags = normalize_tags(parse_list(KEY_TAGS, meta.remove(KEY_TAGS))?);
    let related_files =
        normalize_related_files(parse_list(KEY_RELATED_FILES, meta.remove(KEY_RELATED_FILES))?);

    let mut extra = BTreeMap::new();
    for (key, value) in meta {
        let Some(key) = key.as_str() else {
            return Err(DecodeError::InvalidYaml(
                "front matter keys must be strings".to_string(),
            ));
        };
        extra.insert(key.to_string(), value);
    }

    Ok(CacheEntry {
        category,
        id: id.to_string(),
        topic,
        created_at,
        expires_at,
        codebase_hash,
        tags,
        related_files,
        content: body.to_string(),
        extra,
    })
}

/// Split `---\n<header>---\n<body>` into header and body.
///
/// The single blank line written after the closing delimiter is not part of the body.
fn split_front_matter(text: &str) -> std::result::Result<(&str, &str), DecodeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
        .ok_or(DecodeError::MissingFrontMatter)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            return Ok((header, body));
        }
        offset += line.len();
    }

    Err(DecodeError::MissingFrontMatter)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}

/// Text of a scalar value; `None` for nulls, sequences, mappings and tagged values.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive ISO date-times.
fn parse_date(field: &'static str, value: &Value) -> std::result::Result<NaiveDate, DecodeError> {
    let invalid = || DecodeError::InvalidDate {
        field,
        value: scalar_text(value).unwrap_or_else(|| format!("{value:?}")),
    };
    let text = scalar_text(value).ok_or_else(invalid)?;
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(invalid)
}

fn parse_list(
    field: &'static str,
    value: Option<Value>,
) -> std::result::Result<Vec<String>, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(s.split(',').map(str::to_string).collect()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar_text(item).ok_or(DecodeError::InvalidList(field)))
            .collect(),
        Some(other) => scalar_text(&other)
            .map(|s| vec![s])
            .ok_or(DecodeError::InvalidList(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewEntry;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> CacheEntry {
        NewEntry::new(
            Category::Investigation,
            "user authentication with JWT",
            "# Findings\n\nTokens are signed with HS256.\n",
        )
        .tags(["auth", "jwt"])
        .related_files(["src/auth/login.rs", "src/auth/middleware.rs"])
        .codebase_hash("abc123")
        .into_entry(30, day(2025, 1, 15))
        .unwrap()
    }

    #[test]
    fn encode_writes_expected_layout() {
        let text = encode(&sample()).unwrap();
        assert!(text.starts_with("---\nresearch_type: investigation\n"));
        assert!(text.contains("topic: user authentication with JWT\n"));
        assert!(text.contains("date: 2025-01-15\n"));
        assert!(text.contains("expiry: 2025-02-14\n"));
        assert!(text.contains("codebase_hash: abc123\n"));
        assert!(text.contains("tags:\n- auth\n- jwt\n"));
        assert!(text.ends_with("---\n\n# Findings\n\nTokens are signed with HS256.\n"));
    }

    #[test]
    fn decode_inverts_encode() {
        let entry = sample();
        let text = encode(&entry).unwrap();
        let decoded = decode(entry.category, &entry.id, &text, 30).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn content_with_delimiters_and_leading_newlines_survives() {
        let mut entry = sample();
        entry.content = "\n\n---\nnot: front matter\n---\n".to_string();
        let decoded = decode(entry.category, &entry.id, &encode(&entry).unwrap(), 30).unwrap();
        assert_eq!(decoded.content, entry.content);
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let text = "---\ntopic: caching\ndate: 2025-01-01\nconfidence: high\nsources:\n- a\n- b\n---\n\nbody";
        let entry = decode(Category::Pattern, "caching-2025-01-01", text, 30).unwrap();
        assert_eq!(
            entry.extra.get("confidence"),
            Some(&Value::String("high".into()))
        );
        let again = encode(&entry).unwrap();
        assert!(again.contains("confidence: high\n"));
        assert_eq!(decode(Category::Pattern, &entry.id, &again, 30).unwrap(), entry);
    }

    #[test]
    fn missing_expiry_uses_default() {
        let text = "---\ntopic: caching\ndate: 2025-01-01\n---\nbody";
        let entry = decode(Category::Pattern, "caching-2025-01-01", text, 7).unwrap();
        assert_eq!(entry.expires_at, day(2025, 1, 8));
        assert_eq!(entry.content, "body");
        assert!(entry.tags.is_empty());
        assert!(entry.related_files.is_empty());
    }

    #[test]
    fn legacy_datetime_values_are_accepted() {
        let text = "---\ntopic: t\ndate: '2025-01-01T10:30:00'\nexpiry: 2025-01-31T00:00:00Z\n---\n";
        let entry = decode(Category::Comparison, "t-2025-01-01", text, 30).unwrap();
        assert_eq!(entry.created_at, day(2025, 1, 1));
        assert_eq!(entry.expires_at, day(2025, 1, 31));
    }

    #[test]
    fn list_shapes_are_normalized() {
        let text = "---\ntopic: t\ndate: 2025-01-01\ntags: 'Auth, jwt,AUTH, '\nrelated_files:\n- b.rs\n- 42\n- a.rs\n---\n";
        let entry = decode(Category::Investigation, "t", text, 30).unwrap();
        assert_eq!(entry.tags, vec!["auth", "jwt"]);
        assert_eq!(entry.related_files, vec!["b.rs", "42", "a.rs"]);
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        let no_topic = "---\ndate: 2025-01-01\n---\n";
        assert_eq!(
            decode(Category::Pattern, "x", no_topic, 30),
            Err(DecodeError::MissingField("topic"))
        );
        let blank_topic = "---\ntopic: '  '\ndate: 2025-01-01\n---\n";
        assert_eq!(
            decode(Category::Pattern, "x", blank_topic, 30),
            Err(DecodeError::MissingField("topic"))
        );
        let no_date = "---\ntopic: t\n---\n";
        assert_eq!(
            decode(Category::Pattern, "x", no_date, 30),
            Err(DecodeError::MissingField("date"))
        );
    }

    #[test]
    fn unparsable_dates_are_malformed() {
        let text = "---\ntopic: t\ndate: last tuesday\n---\n";
        assert!(matches!(
            decode(Category::Pattern, "x", text, 30),
            Err(DecodeError::InvalidDate { field: "date", .. })
        ));
        let text = "---\ntopic: t\ndate: 2025-01-01\nexpiry: 2025-13-01\n---\n";
        assert!(matches!(
            decode(Category::Pattern, "x", text, 30),
            Err(DecodeError::InvalidDate { field: "expiry", .. })
        ));
    }

    #[test]
    fn expiry_before_date_is_malformed() {
        let text = "---\ntopic: t\ndate: 2025-01-10\nexpiry: 2025-01-09\n---\n";
        assert!(matches!(
            decode(Category::Pattern, "x", text, 30),
            Err(DecodeError::ExpiryBeforeCreation { .. })
        ));
    }

    #[test]
    fn structural_problems_are_malformed() {
        assert_eq!(
            decode(Category::Pattern, "x", "just some notes", 30),
            Err(DecodeError::MissingFrontMatter)
        );
        assert_eq!(
            decode(Category::Pattern, "x", "---\ntopic: t\n", 30),
            Err(DecodeError::MissingFrontMatter)
        );
        assert!(matches!(
            decode(Category::Pattern, "x", "---\n- a\n- b\n---\n", 30),
            Err(DecodeError::InvalidYaml(_))
        ));
        assert!(matches!(
            decode(Category::Pattern, "x", "---\ntopic: [unclosed\n---\n", 30),
            Err(DecodeError::InvalidYaml(_))
        ));
        assert_eq!(
            decode(
                Category::Pattern,
                "x",
                "---\ntopic: t\ndate: 2025-01-01\ntags:\n- {a: 1}\n---\n",
                30
            ),
            Err(DecodeError::InvalidList("tags"))
        );
    }

    #[test]
    fn research_type_mismatch_uses_location() {
        let text = "---\nresearch_type: comparison\ntopic: t\ndate: 2025-01-01\n---\n";
        let entry = decode(Category::Pattern, "t", text, 30).unwrap();
        assert_eq!(entry.category, Category::Pattern);
        assert!(entry.extra.is_empty());
    }
}
