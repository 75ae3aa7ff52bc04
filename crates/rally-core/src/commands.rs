use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, Datelike, Local, Utc};
use tracing::{debug, info, instrument};

use crate::calendar::{self, CalendarEvent, LayoutOptions};
use crate::cli::{AddArgs, Command, FilterArgs};
use crate::config::Config;
use crate::datastore::DataStore;
use crate::event::{Status, Tournament};
use crate::filter::Filter;
use crate::render::Renderer;

#[instrument(skip(store, cfg, renderer, command))]
pub fn dispatch(
    store: &DataStore,
    cfg: &Config,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    let now = Utc::now();
    debug!(?command, "dispatching command");

    match command {
        Command::Add(args) => cmd_add(store, args, now),
        Command::List { filter } => cmd_list(store, renderer, filter),
        Command::Queue => cmd_queue(store, renderer),
        Command::Approve { keys } => cmd_approve(store, &keys, now),
        Command::Reject { keys } => cmd_reject(store, &keys, now),
        Command::Remove { key } => cmd_remove(store, &key),
        Command::Info { key } => cmd_info(store, renderer, &key),
        Command::Calendar {
            month,
            tracks,
            filter,
        } => cmd_calendar(store, cfg, renderer, month.as_deref(), tracks, filter),
    }
}

#[instrument(skip_all, fields(name = %args.name))]
fn cmd_add(store: &DataStore, args: AddArgs, now: DateTime<Utc>) -> anyhow::Result<()> {
    info!("command add");

    let mut tournament = Tournament::new_submission(
        args.name,
        args.city,
        args.region,
        args.level,
        args.start,
        args.end,
        now,
    )?;
    tournament.slug = store.unique_slug(&tournament.slug)?;
    tournament.venue = args.venue;
    tournament.categories = args.categories;
    tournament.featured = args.featured;
    tournament.registration_url = args.url;
    tournament.entry_fee_min = args.fee_min;
    tournament.entry_fee_max = args.fee_max;

    store.add_submission(tournament.clone())?;
    println!(
        "Submitted {} ({}) for review.",
        tournament.slug, tournament.id
    );
    Ok(())
}

#[instrument(skip(store, renderer, filter))]
fn cmd_list(store: &DataStore, renderer: &mut Renderer, filter: FilterArgs) -> anyhow::Result<()> {
    info!("command list");

    let published = store.load_published()?;
    let filter = Filter::from(filter);
    let mut matched = filter.apply(&published);
    matched.sort_by(|a, b| a.date_start.cmp(&b.date_start).then(a.slug.cmp(&b.slug)));

    if matched.is_empty() {
        println!("No tournaments match.");
        return Ok(());
    }
    renderer.print_tournament_table(&matched)?;
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_queue(store: &DataStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command queue");

    let submissions = store.load_submissions()?;
    let pending: Vec<&Tournament> = submissions
        .iter()
        .filter(|t| t.status == Status::Pending)
        .collect();

    if pending.is_empty() {
        println!("Review queue is empty.");
        return Ok(());
    }
    renderer.print_tournament_table(&pending)?;
    Ok(())
}

#[instrument(skip(store, keys, now))]
fn cmd_approve(store: &DataStore, keys: &[String], now: DateTime<Utc>) -> anyhow::Result<()> {
    info!("command approve");

    for key in keys {
        let submissions = store.load_submissions()?;
        let id = resolve(&submissions, key)
            .with_context(|| format!("cannot resolve submission {key:?}"))?;
        let published = store.publish(id, now)?;
        println!("Approved {}.", published.slug);
    }
    Ok(())
}

#[instrument(skip(store, keys, now))]
fn cmd_reject(store: &DataStore, keys: &[String], now: DateTime<Utc>) -> anyhow::Result<()> {
    info!("command reject");

    for key in keys {
        let submissions = store.load_submissions()?;
        let id = resolve(&submissions, key)
            .with_context(|| format!("cannot resolve submission {key:?}"))?;
        let rejected = store.reject(id, now)?;
        println!("Rejected {}.", rejected.slug);
    }
    Ok(())
}

#[instrument(skip(store))]
fn cmd_remove(store: &DataStore, key: &str) -> anyhow::Result<()> {
    info!("command remove");

    let published = store.load_published()?;
    let id = resolve(&published, key)
        .with_context(|| format!("cannot resolve published tournament {key:?}"))?;
    let removed = store.remove_published(id)?;
    println!("Removed {}.", removed.slug);
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_info(store: &DataStore, renderer: &mut Renderer, key: &str) -> anyhow::Result<()> {
    info!("command info");

    let published = store.load_published()?;
    let submissions = store.load_submissions()?;
    let all: Vec<Tournament> = published.into_iter().chain(submissions).collect();
    let id = resolve(&all, key).with_context(|| format!("cannot resolve tournament {key:?}"))?;
    let tournament = all
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("tournament disappeared while resolving {key:?}"))?;

    renderer.print_tournament_info(tournament)?;
    Ok(())
}

#[instrument(skip(store, cfg, renderer, filter))]
fn cmd_calendar(
    store: &DataStore,
    cfg: &Config,
    renderer: &mut Renderer,
    month: Option<&str>,
    tracks: Option<usize>,
    filter: FilterArgs,
) -> anyhow::Result<()> {
    info!("command calendar");

    let (year, month) = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let published = store.load_published()?;
    let filter = Filter::from(filter);
    let matched = filter.apply(&published);

    let events: Vec<CalendarEvent> = matched.iter().map(|t| CalendarEvent::from(*t)).collect();
    let opts = LayoutOptions {
        max_visible_tracks: tracks.unwrap_or(cfg.calendar.max_visible_tracks),
    };
    let layout = calendar::month_layout(year, month, &events, &opts)?;

    debug!(
        year,
        month,
        events = events.len(),
        weeks = layout.weeks.len(),
        "rendering calendar"
    );
    renderer.print_month_calendar(&layout, &matched)?;
    Ok(())
}

/// Resolves a user-supplied key to a tournament id: exact slug, exact id, or
/// an unambiguous prefix of either.
fn resolve(items: &[Tournament], key: &str) -> anyhow::Result<uuid::Uuid> {
    if let Some(t) = items.iter().find(|t| t.slug == key) {
        return Ok(t.id);
    }
    if let Ok(id) = key.parse::<uuid::Uuid>() {
        if items.iter().any(|t| t.id == id) {
            return Ok(id);
        }
        bail!("no tournament with id {id}");
    }

    let mut matches = items
        .iter()
        .filter(|t| t.slug.starts_with(key) || t.id.to_string().starts_with(key));
    let first = matches.next().ok_or_else(|| anyhow!("no match for {key:?}"))?;
    if matches.next().is_some() {
        bail!("ambiguous key {key:?}; use the full slug or id");
    }
    Ok(first.id)
}

fn parse_month(raw: &str) -> anyhow::Result<(i32, u32)> {
    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("expected YYYY-MM, got {raw:?}"))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("invalid year in {raw:?}"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("invalid month in {raw:?}"))?;
    if !(1..=12).contains(&month) {
        bail!("month out of range (1-12): {month}");
    }
    Ok((year, month))
}
