use chrono::{NaiveDate, Utc};
use rally_core::calendar::{CalendarEvent, LayoutOptions, month_layout};
use rally_core::datastore::DataStore;
use rally_core::event::{Level, Region, Status, Tournament};
use rally_core::filter::Filter;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn submission(name: &str, region: Region, start: NaiveDate, end: NaiveDate) -> Tournament {
    Tournament::new_submission(
        name.to_string(),
        "Tampa".to_string(),
        region,
        Level::AllLevels,
        start,
        Some(end),
        Utc::now(),
    )
    .expect("valid submission")
}

#[test]
fn submission_review_and_calendar_flow() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");

    let mut classic = submission(
        "Citrus Classic",
        Region::CentralFlorida,
        date(2026, 3, 2),
        date(2026, 3, 4),
    );
    classic.featured = true;
    let smash = submission(
        "Gulf Smash",
        Region::TampaBay,
        date(2026, 3, 3),
        date(2026, 3, 5),
    );
    let unreviewed = submission(
        "Backlog Bash",
        Region::Panhandle,
        date(2026, 3, 6),
        date(2026, 3, 6),
    );

    store.add_submission(classic.clone()).expect("queue classic");
    store.add_submission(smash.clone()).expect("queue smash");
    store
        .add_submission(unreviewed.clone())
        .expect("queue backlog");

    let now = Utc::now();
    store.publish(classic.id, now).expect("approve classic");
    store.publish(smash.id, now).expect("approve smash");

    // The unreviewed submission stays out of the published directory.
    let published = store.load_published().expect("load published");
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|t| t.status == Status::Approved));
    let remaining = store.load_submissions().expect("load submissions");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, unreviewed.id);

    // Event source contract: filter approved records, then lay them out.
    let matched = Filter::default().apply(&published);
    let events: Vec<CalendarEvent> = matched.iter().map(|t| CalendarEvent::from(*t)).collect();
    let layout =
        month_layout(2026, 3, &events, &LayoutOptions::default()).expect("layout builds");

    // March 2026 opens on a Sunday; both events sit in week 0 and overlap
    // Tue-Wed, so they occupy separate tracks.
    let week = &layout.weeks[0];
    assert_eq!(week.bars.len(), 2);
    assert_eq!(week.overflow, 0);
    let classic_bar = week
        .bars
        .iter()
        .find(|b| b.event_id == classic.id.to_string())
        .expect("classic bar");
    let smash_bar = week
        .bars
        .iter()
        .find(|b| b.event_id == smash.id.to_string())
        .expect("smash bar");
    assert_eq!((classic_bar.track, classic_bar.start_col, classic_bar.span), (0, 1, 3));
    assert_eq!((smash_bar.track, smash_bar.start_col, smash_bar.span), (1, 2, 3));
}

#[test]
fn rejected_submissions_stay_visible_in_the_queue() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");

    let entry = submission(
        "Dubious Duel",
        Region::NorthFlorida,
        date(2026, 5, 1),
        date(2026, 5, 2),
    );
    store.add_submission(entry.clone()).expect("queue entry");
    store.reject(entry.id, Utc::now()).expect("reject entry");

    let submissions = store.load_submissions().expect("load submissions");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].status, Status::Rejected);
    assert!(store.load_published().expect("load published").is_empty());

    // A rejected submission cannot be approved afterwards.
    assert!(store.publish(entry.id, Utc::now()).is_err());
}

#[test]
fn slug_collisions_get_numeric_suffixes() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");

    let first = submission(
        "Citrus Open",
        Region::CentralFlorida,
        date(2026, 3, 14),
        date(2026, 3, 14),
    );
    store.add_submission(first).expect("queue first");

    assert_eq!(
        store.unique_slug("citrus-open").expect("dedupe"),
        "citrus-open-2"
    );
    assert_eq!(store.unique_slug("other").expect("fresh slug"), "other");
}

#[test]
fn datastore_roundtrips_through_jsonl() {
    let temp = tempdir().expect("tempdir");
    let store = DataStore::open(temp.path()).expect("open datastore");

    let mut entry = submission(
        "Roundtrip Rally",
        Region::SouthFlorida,
        date(2026, 7, 10),
        date(2026, 7, 12),
    );
    entry.categories = vec!["Open".to_string(), "Mixed".to_string()];
    entry.entry_fee_min = Some(25);
    store.add_submission(entry.clone()).expect("queue entry");

    // Reopen to make sure nothing depended on in-process state.
    let reopened = DataStore::open(temp.path()).expect("reopen datastore");
    let loaded = reopened.load_submissions().expect("load submissions");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, entry.id);
    assert_eq!(loaded[0].slug, "roundtrip-rally");
    assert_eq!(loaded[0].categories, entry.categories);
    assert_eq!(loaded[0].entry_fee_min, Some(25));
    assert_eq!(loaded[0].region, Region::SouthFlorida);
}
