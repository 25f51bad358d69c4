//! Canonical entry ids derived from topic and creation date

use chrono::NaiveDate;

/// Lowercase the topic and collapse every run of non-alphanumeric characters
/// into a single hyphen, trimming hyphens at both ends.
#[must_use]
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut pending_hyphen = false;

    for c in topic.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Id for an entry about `topic` created on `date`: `{slug}-{YYYY-MM-DD}`.
///
/// Deterministic: the same topic on the same day always yields the same id,
/// so a second add replaces the first.
#[must_use]
pub fn make_id(topic: &str, date: NaiveDate) -> String {
    let slug = slugify(topic);
    let date = date.format("%Y-%m-%d");
    if slug.is_empty() {
        date.to_string()
    } else {
        format!("{slug}-{date}")
    }
}
