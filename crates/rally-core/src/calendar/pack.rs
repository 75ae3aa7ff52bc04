use anyhow::bail;
use tracing::trace;

use super::grid::Week;
use super::{CalendarEvent, LayoutOptions};

/// A horizontal bar positioned within one week: `start_col..start_col + span`
/// on row `track`. A multi-week event yields one bar per week it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedBar {
    pub event_id: String,
    pub start_col: usize,
    pub span: usize,
    pub track: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekLayout {
    pub week: Week,
    /// Bars on tracks below the visibility cap, ordered by (track, start_col).
    pub bars: Vec<PositionedBar>,
    /// Events packed onto capped-off tracks; rendered as "+N more".
    pub overflow: usize,
}

/// Closed-interval overlap: an event belongs to a week if its range touches
/// any of the week's seven days.
pub fn events_in_week<'a>(events: &'a [CalendarEvent], week: &Week) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|ev| ev.date_start <= week.end() && ev.date_end >= week.start())
        .collect()
}

struct Clipped<'a> {
    event: &'a CalendarEvent,
    start_col: usize,
    end_col: usize,
}

impl Clipped<'_> {
    fn span(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

/// Greedy first-fit track assignment. Events are clipped to the week, sorted
/// (start col, longest span first, featured first, id), and each takes the
/// lowest track where it overlaps nothing already placed. Greedy packing by
/// start column is not guaranteed to minimize track count in general; with a
/// small visibility cap and an overflow counter that trade is intentional.
#[tracing::instrument(skip(events, week, opts), fields(candidates = events.len()))]
pub fn pack_week(
    events: &[&CalendarEvent],
    week: &Week,
    opts: &LayoutOptions,
) -> anyhow::Result<WeekLayout> {
    if opts.max_visible_tracks == 0 {
        bail!("max_visible_tracks must be at least 1");
    }

    let mut clipped = Vec::with_capacity(events.len());
    for ev in events {
        if ev.date_end < ev.date_start {
            bail!(
                "event {} ends before it starts ({} < {})",
                ev.id,
                ev.date_end,
                ev.date_start
            );
        }
        if ev.date_start > week.end() || ev.date_end < week.start() {
            trace!(id = %ev.id, "event does not touch this week; skipping");
            continue;
        }
        let start = ev.date_start.max(week.start());
        let end = ev.date_end.min(week.end());
        let start_col = start.signed_duration_since(week.start()).num_days() as usize;
        let end_col = end.signed_duration_since(week.start()).num_days() as usize;
        clipped.push(Clipped {
            event: ev,
            start_col,
            end_col,
        });
    }

    clipped.sort_by(|a, b| {
        a.start_col
            .cmp(&b.start_col)
            .then_with(|| b.span().cmp(&a.span()))
            .then_with(|| b.event.featured.cmp(&a.event.featured))
            .then_with(|| a.event.id.cmp(&b.event.id))
    });

    // Per track, the closed column ranges already placed on it.
    let mut tracks: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut bars = Vec::with_capacity(clipped.len());
    let mut overflow = 0;

    for item in &clipped {
        let free = tracks.iter().position(|ranges| {
            ranges
                .iter()
                .all(|&(start, end)| item.end_col < start || item.start_col > end)
        });
        let track = match free {
            Some(idx) => idx,
            None => {
                tracks.push(Vec::new());
                tracks.len() - 1
            }
        };
        tracks[track].push((item.start_col, item.end_col));

        if track < opts.max_visible_tracks {
            bars.push(PositionedBar {
                event_id: item.event.id.clone(),
                start_col: item.start_col,
                span: item.span(),
                track,
            });
        } else {
            overflow += 1;
        }
    }

    bars.sort_by(|a, b| {
        a.track
            .cmp(&b.track)
            .then_with(|| a.start_col.cmp(&b.start_col))
    });

    trace!(
        bars = bars.len(),
        overflow,
        tracks = tracks.len(),
        "packed week"
    );
    Ok(WeekLayout {
        week: *week,
        bars,
        overflow,
    })
}
