use anyhow::{Context, bail};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::trace;

/// Seven consecutive dates, Sunday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week([NaiveDate; 7]);

impl Week {
    pub(crate) fn starting(sunday: NaiveDate) -> anyhow::Result<Self> {
        debug_assert_eq!(sunday.weekday(), Weekday::Sun);
        let mut days = [sunday; 7];
        for idx in 1..7 {
            days[idx] = days[idx - 1]
                .succ_opt()
                .context("calendar date out of range")?;
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> &[NaiveDate; 7] {
        &self.0
    }

    pub fn start(&self) -> NaiveDate {
        self.0[0]
    }

    pub fn end(&self) -> NaiveDate {
        self.0[6]
    }

    /// Column (0 = Sunday) of a date inside this week, if it falls in it.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start() || date > self.end() {
            return None;
        }
        Some(date.signed_duration_since(self.start()).num_days() as usize)
    }
}

impl std::ops::Index<usize> for Week {
    type Output = NaiveDate;

    fn index(&self, col: usize) -> &NaiveDate {
        &self.0[col]
    }
}

/// A month partitioned into complete Sunday-start weeks. Leading and trailing
/// cells borrowed from the adjacent months are kept so a renderer can draw
/// them; `in_month` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    weeks: Vec<Week>,
}

impl MonthGrid {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Partitions `(year, month)` into weeks. `month` is 1-based; anything outside
/// 1..=12 is a caller error. Week count falls out of the weekday alignment
/// (4, 5, or 6), never assumed.
#[tracing::instrument]
pub fn month_grid(year: i32, month: u32) -> anyhow::Result<MonthGrid> {
    if !(1..=12).contains(&month) {
        bail!("month out of range (1-12): {month}");
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("unrepresentable month: {year}-{month:02}"))?;
    let last = last_day_of_month(first)?;

    let lead = u64::from(first.weekday().num_days_from_sunday());
    let mut sunday = first
        .checked_sub_days(Days::new(lead))
        .context("grid start out of range")?;

    let mut weeks = Vec::with_capacity(6);
    loop {
        let week = Week::starting(sunday)?;
        let done = week.end() >= last;
        weeks.push(week);
        if done {
            break;
        }
        sunday = sunday
            .checked_add_days(Days::new(7))
            .context("grid end out of range")?;
    }

    trace!(year, month, weeks = weeks.len(), "partitioned month");
    Ok(MonthGrid { year, month, weeks })
}

fn last_day_of_month(first: NaiveDate) -> anyhow::Result<NaiveDate> {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .context("month end out of range")
}
