pub mod grid;
pub mod pack;

pub use grid::{MonthGrid, Week, month_grid};
pub use pack::{PositionedBar, WeekLayout, events_in_week, pack_week};

use anyhow::bail;
use chrono::NaiveDate;

use crate::event::Tournament;

pub const DEFAULT_VISIBLE_TRACKS: usize = 3;

/// The minimal shape the layout engine needs. Anything date-ranged can be
/// laid out; the directory feeds it approved tournaments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub featured: bool,
}

impl From<&Tournament> for CalendarEvent {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id.to_string(),
            date_start: t.date_start,
            date_end: t.date_end,
            featured: t.featured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Tracks rendered per week before events spill into the "+N more" count.
    pub max_visible_tracks: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_visible_tracks: DEFAULT_VISIBLE_TRACKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLayout {
    pub grid: MonthGrid,
    /// One layout per grid week, in week order.
    pub weeks: Vec<WeekLayout>,
}

/// Runs the full pipeline: partition the month into weeks, select the events
/// touching each week, pack them into tracks. Pure and deterministic: the same
/// `(year, month, events)` always yields the same layout.
#[tracing::instrument(skip(events, opts), fields(events = events.len()))]
pub fn month_layout(
    year: i32,
    month: u32,
    events: &[CalendarEvent],
    opts: &LayoutOptions,
) -> anyhow::Result<MonthLayout> {
    // Reject bad input before any layout work so a failure never leaves a
    // partial result behind.
    if opts.max_visible_tracks == 0 {
        bail!("max_visible_tracks must be at least 1");
    }
    for ev in events {
        if ev.date_end < ev.date_start {
            bail!(
                "event {} ends before it starts ({} < {})",
                ev.id,
                ev.date_end,
                ev.date_start
            );
        }
    }

    let grid = month_grid(year, month)?;
    let weeks = grid
        .weeks()
        .iter()
        .map(|week| {
            let selected = events_in_week(events, week);
            pack_week(&selected, week, opts)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(MonthLayout { grid, weeks })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{CalendarEvent, LayoutOptions, month_layout};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn event(id: &str, start: NaiveDate, end: NaiveDate) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            date_start: start,
            date_end: end,
            featured: false,
        }
    }

    #[test]
    fn multi_week_event_is_clipped_per_week() {
        // Spans the first two weeks of March 2026: Mar 4 (Wed, week 0)
        // through Mar 10 (Tue, week 1).
        let ev = event("spring-swing", date(2026, 3, 4), date(2026, 3, 10));
        let layout =
            month_layout(2026, 3, &[ev], &LayoutOptions::default()).expect("layout succeeds");

        let first = &layout.weeks[0].bars;
        let second = &layout.weeks[1].bars;
        assert_eq!(first.len(), 1);
        assert_eq!((first[0].start_col, first[0].span), (3, 4));
        assert_eq!(second.len(), 1);
        assert_eq!((second[0].start_col, second[0].span), (0, 3));
        for week in &layout.weeks[2..] {
            assert!(week.bars.is_empty());
            assert_eq!(week.overflow, 0);
        }
    }

    #[test]
    fn event_from_prior_month_clips_to_column_zero() {
        // Starts in February, ends inside the first week of March 2026.
        let ev = event("carryover", date(2026, 2, 25), date(2026, 3, 3));
        let layout =
            month_layout(2026, 3, &[ev], &LayoutOptions::default()).expect("layout succeeds");

        let bars = &layout.weeks[0].bars;
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].start_col, 0);
        assert_eq!(bars[0].span, 3);
    }

    #[test]
    fn every_selected_event_is_a_bar_or_counted_as_overflow() {
        let week_start = date(2026, 3, 1);
        let events: Vec<CalendarEvent> = (0..9)
            .map(|i| {
                let day = week_start + chrono::Days::new(i % 7);
                event(&format!("e{i}"), day, day + chrono::Days::new(2))
            })
            .collect();

        let opts = LayoutOptions {
            max_visible_tracks: 2,
        };
        let layout = month_layout(2026, 3, &events, &opts).expect("layout succeeds");
        for (week, wl) in layout.grid.weeks().iter().zip(&layout.weeks) {
            let selected = super::events_in_week(&events, week).len();
            assert_eq!(wl.bars.len() + wl.overflow, selected);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let events = vec![
            event("b", date(2026, 3, 2), date(2026, 3, 6)),
            event("a", date(2026, 3, 2), date(2026, 3, 6)),
            event("c", date(2026, 3, 5), date(2026, 3, 12)),
        ];
        let opts = LayoutOptions::default();
        let first = month_layout(2026, 3, &events, &opts).expect("first run");
        let second = month_layout(2026, 3, &events, &opts).expect("second run");
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_inverted_event_range() {
        let ev = event("backwards", date(2026, 3, 10), date(2026, 3, 4));
        let err = month_layout(2026, 3, &[ev], &LayoutOptions::default())
            .expect_err("inverted range must be rejected");
        assert!(err.to_string().contains("backwards"));
    }

    #[test]
    fn rejects_zero_track_cap() {
        let opts = LayoutOptions {
            max_visible_tracks: 0,
        };
        assert!(month_layout(2026, 3, &[], &opts).is_err());
    }
}
