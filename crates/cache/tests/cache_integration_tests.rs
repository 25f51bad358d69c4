//! End-to-end lifecycle of a research cache: add, list, search, expire, clear.

use chrono::NaiveDate;
use research_cache::{
    Category, ClearScope, Error, Freshness, ListFilter, Maintenance, NewEntry, QueryEngine, Store,
    StoreConfig, is_expired,
};
use std::fs;
use std::thread;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (TempDir, Store) {
    let temp = TempDir::new().unwrap();
    let store = Store::new(StoreConfig::new(temp.path().join("cache")));
    (temp, store)
}

fn snapshot(store: &Store) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for category in Category::ALL {
        let dir = store.category_dir(category);
        let Ok(read_dir) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in read_dir {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".md") {
                files.push((
                    format!("{}/{name}", category.dir_name()),
                    fs::read(entry.path()).unwrap(),
                ));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn research_lifecycle() {
    let (_temp, store) = setup();
    let created = day(2025, 1, 15);

    // 1. add
    let entry = NewEntry::new(
        Category::Investigation,
        "user authentication with JWT",
        "# Findings\n\nLogin issues a signed token.\n",
    )
    .tags(["auth", "jwt"])
    .related_files(["src/auth/login.rs"])
    .into_entry(store.config().default_expiry_days, created)
    .unwrap();
    let id = store.add(&entry).unwrap();
    assert_eq!(id, "user-authentication-with-jwt-2025-01-15");
    assert_eq!(entry.expires_at, day(2025, 2, 14));

    let unrelated = NewEntry::new(Category::Comparison, "postgres vs sqlite", "storage engines")
        .tags(["database"])
        .into_entry(30, created)
        .unwrap();
    store.add(&unrelated).unwrap();

    // 2. list
    let engine = QueryEngine::new(&store);
    let filter = ListFilter {
        category: Some(Category::Investigation),
        ..ListFilter::default()
    };
    let listing = engine.list(&filter, created).unwrap();
    assert_eq!(listing.entries, vec![entry.clone()]);
    assert_eq!(listing.warnings, 0);

    // 3. search
    let results = engine.search("jwt", created).unwrap();
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.hits[0].entry.id, id);
    assert_eq!(results.hits[0].freshness, Freshness::Fresh);

    // 4. expiry
    let later = day(2025, 2, 15);
    assert!(!is_expired(&entry, day(2025, 2, 14)));
    assert!(is_expired(&entry, later));

    // 5. clear expired
    let maintenance = Maintenance::new(&store);
    let report = maintenance.clear(ClearScope::Expired, false, later).unwrap();
    assert_eq!(report.removed, 2);
    assert!(engine.list(&ListFilter::default(), later).unwrap().entries.is_empty());
    assert!(engine.search("jwt", later).unwrap().hits.is_empty());

    // 6. clear all without confirmation
    store
        .add(
            &NewEntry::new(Category::Pattern, "retry with backoff", "exponential")
                .into_entry(30, later)
                .unwrap(),
        )
        .unwrap();
    let before = snapshot(&store);
    let err = maintenance.clear(ClearScope::All, false, later).unwrap_err();
    assert!(matches!(err, Error::ConfirmationRequired));
    assert_eq!(snapshot(&store), before);
}

#[test]
fn clear_expired_leaves_others_byte_identical() {
    let (_temp, store) = setup();
    for (topic, created) in [
        ("stale one", day(2024, 11, 1)),
        ("stale two", day(2024, 12, 1)),
        ("fresh one", day(2025, 1, 20)),
        ("fresh two", day(2025, 1, 25)),
    ] {
        let entry = NewEntry::new(Category::BestPractice, topic, format!("{topic}\n---\n"))
            .into_entry(30, created)
            .unwrap();
        store.add(&entry).unwrap();
    }
    let today = day(2025, 2, 1);
    let survivors: Vec<_> = snapshot(&store)
        .into_iter()
        .filter(|(name, _)| name.contains("fresh"))
        .collect();

    let report = Maintenance::new(&store)
        .clear(ClearScope::Expired, false, today)
        .unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(snapshot(&store), survivors);
}

#[test]
fn stats_total_matches_decodable_scan() {
    let (_temp, store) = setup();
    for (category, topic) in [
        (Category::Investigation, "a"),
        (Category::Pattern, "b"),
        (Category::Pattern, "c"),
    ] {
        store
            .add(
                &NewEntry::new(category, topic, "")
                    .tags(["shared"])
                    .into_entry(30, day(2025, 1, 1))
                    .unwrap(),
            )
            .unwrap();
    }
    let dir = store.category_dir(Category::Pattern);
    fs::write(dir.join("hand-edited.md"), "---\ntopic: [\n---\n").unwrap();

    let decodable = store
        .scan_all()
        .filter(|s| s.as_ref().is_ok_and(|s| s.outcome.is_ok()))
        .count();
    let stats = QueryEngine::new(&store).stats(day(2025, 1, 2)).unwrap();
    assert_eq!(stats.total, decodable);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.top_tags[0].tag, "shared");
    assert_eq!(stats.top_tags[0].count, 3);
}

#[test]
fn adding_twice_keeps_the_second_version() {
    let (_temp, store) = setup();
    let first = NewEntry::new(Category::Pattern, "event sourcing", "first draft")
        .into_entry(30, day(2025, 1, 1))
        .unwrap();
    let second = NewEntry::new(Category::Pattern, "Event Sourcing", "second draft")
        .tags(["events"])
        .into_entry(30, day(2025, 1, 1))
        .unwrap();
    assert_eq!(first.id, second.id);

    store.add(&first).unwrap();
    store.add(&second).unwrap();

    assert_eq!(store.get(Category::Pattern, &first.id).unwrap(), second);
    assert_eq!(snapshot(&store).len(), 1);
}

#[test]
fn malformed_entries_surface_as_warnings_not_failures() {
    let (_temp, store) = setup();
    store
        .add(
            &NewEntry::new(Category::Investigation, "caching layer", "notes")
                .into_entry(30, day(2025, 1, 1))
                .unwrap(),
        )
        .unwrap();
    let dir = store.category_dir(Category::Investigation);
    fs::write(dir.join("garbage.md"), "just text").unwrap();

    let engine = QueryEngine::new(&store);
    let listing = engine.list(&ListFilter::default(), day(2025, 1, 2)).unwrap();
    assert_eq!(listing.entries.len(), 1);
    assert_eq!(listing.warnings, 1);

    let results = engine.search("caching", day(2025, 1, 2)).unwrap();
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.warnings, 1);

    assert!(matches!(
        engine.show(Category::Investigation, "garbage"),
        Err(Error::Malformed(_))
    ));
}

#[test]
fn clear_expired_never_removes_entries_refreshed_concurrently() {
    let (_temp, store) = setup();
    let created = day(2025, 1, 1);
    let today = day(2025, 6, 1);
    let stale: Vec<_> = (0..40)
        .map(|n| {
            NewEntry::new(Category::Pattern, format!("topic {n}"), "old notes")
                .into_entry(30, created)
                .unwrap()
        })
        .collect();
    for entry in &stale {
        store.add(entry).unwrap();
    }

    thread::scope(|scope| {
        scope.spawn(|| {
            for entry in &stale {
                let mut fresh = entry.clone();
                fresh.content = "refreshed notes".to_string();
                fresh.expires_at = day(2025, 12, 31);
                store.add(&fresh).unwrap();
            }
        });
        scope.spawn(|| {
            for _ in 0..5 {
                Maintenance::new(&store)
                    .clear(ClearScope::Expired, false, today)
                    .unwrap();
            }
        });
    });

    // Each refresh lands either after a deletion (and recreates the file) or
    // before it (and the locked re-check keeps it), so every id survives.
    for entry in &stale {
        let stored = store.get(Category::Pattern, &entry.id).unwrap();
        assert_eq!(stored.content, "refreshed notes");
        assert!(!is_expired(&stored, today));
    }
}
