use std::collections::BTreeMap;
use std::fmt;

use anyhow::bail;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Region {
    #[serde(rename = "South Florida")]
    SouthFlorida,
    #[serde(rename = "Central Florida")]
    CentralFlorida,
    #[serde(rename = "Tampa Bay")]
    TampaBay,
    #[serde(rename = "North Florida")]
    NorthFlorida,
    #[serde(rename = "Panhandle")]
    Panhandle,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Region::SouthFlorida => "South Florida",
            Region::CentralFlorida => "Central Florida",
            Region::TampaBay => "Tampa Bay",
            Region::NorthFlorida => "North Florida",
            Region::Panhandle => "Panhandle",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Level {
    Amateur,
    Intermediate,
    #[serde(rename = "Pro/Open")]
    #[value(name = "pro-open")]
    ProOpen,
    #[serde(rename = "Seniors (50+)")]
    Seniors,
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Amateur => "Amateur",
            Level::Intermediate => "Intermediate",
            Level::ProOpen => "Pro/Open",
            Level::Seniors => "Seniors (50+)",
            Level::AllLevels => "All Levels",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,

    pub name: String,

    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    pub date_start: NaiveDate,

    pub date_end: NaiveDate,

    pub city: String,

    #[serde(default)]
    pub venue: Option<String>,

    pub region: Region,

    pub level: Level,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub registration_url: Option<String>,

    #[serde(default)]
    pub entry_fee_min: Option<u32>,

    #[serde(default)]
    pub entry_fee_max: Option<u32>,

    pub status: Status,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Tournament {
    /// A fresh pending submission. A missing end date means a single-day
    /// event; an end before the start is the submitter's error and is
    /// rejected here, never silently corrected.
    pub fn new_submission(
        name: String,
        city: String,
        region: Region,
        level: Level,
        date_start: NaiveDate,
        date_end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Self> {
        let date_end = date_end.unwrap_or(date_start);
        if date_end < date_start {
            bail!("tournament ends before it starts: {date_end} < {date_start}");
        }
        let slug = slugify(&name);
        if slug.is_empty() {
            bail!("tournament name {name:?} produces an empty slug");
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            slug,
            description: None,
            date_start,
            date_end,
            city,
            venue: None,
            region,
            level,
            categories: vec![],
            featured: false,
            registration_url: None,
            entry_fee_min: None,
            entry_fee_max: None,
            status: Status::Pending,
            created: now,
            modified: now,
            extra: BTreeMap::new(),
        })
    }

    pub fn single_day(&self) -> bool {
        self.date_start == self.date_end
    }

    /// "Mar 14, 2026", "Mar 14-15, 2026", or "Mar 31 - Apr 1, 2026".
    pub fn date_label(&self) -> String {
        if self.single_day() {
            return format!(
                "{} {}, {}",
                self.date_start.format("%b"),
                self.date_start.day(),
                self.date_start.year()
            );
        }
        let (start, end) = (self.date_start, self.date_end);
        if start.month() == end.month() && start.year() == end.year() {
            format!(
                "{} {}-{}, {}",
                start.format("%b"),
                start.day(),
                end.day(),
                end.year()
            )
        } else {
            format!(
                "{} {} - {} {}, {}",
                start.format("%b"),
                start.day(),
                end.format("%b"),
                end.day(),
                end.year()
            )
        }
    }

    pub fn fee_label(&self) -> String {
        match (self.entry_fee_min, self.entry_fee_max) {
            (Some(min), Some(max)) if min != max => format!("${min}-${max}"),
            (Some(min), _) => format!("${min}+"),
            (None, Some(max)) => format!("up to ${max}"),
            (None, None) => String::new(),
        }
    }
}

/// Lowercase, keep word characters, collapse runs of whitespace and dashes
/// into single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    slug
}
