use chrono::NaiveDate;
use tracing::trace;

use crate::cli::FilterArgs;
use crate::event::{Level, Region, Tournament};

/// Listing filter applied to the published directory before anything is
/// rendered or laid out. All criteria are conjunctive; an empty filter
/// matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub region: Option<Region>,
    pub level: Option<Level>,
    pub category: Option<String>,
    pub featured_only: bool,
    /// Window bounds use the same closed-interval overlap rule as the
    /// calendar: a tournament matches if its date range touches the window.
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub text: Option<String>,
}

impl From<FilterArgs> for Filter {
    fn from(args: FilterArgs) -> Self {
        Self {
            region: args.region,
            level: args.level,
            category: args.category,
            featured_only: args.featured,
            from: args.from,
            until: args.until,
            text: args.search,
        }
    }
}

impl Filter {
    pub fn matches(&self, t: &Tournament) -> bool {
        if let Some(region) = self.region
            && t.region != region
        {
            return false;
        }
        if let Some(level) = self.level
            && t.level != level
        {
            return false;
        }
        if self.featured_only && !t.featured {
            return false;
        }
        if let Some(category) = &self.category
            && !t.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
        {
            return false;
        }
        if let Some(from) = self.from
            && t.date_end < from
        {
            return false;
        }
        if let Some(until) = self.until
            && t.date_start > until
        {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = t.name.to_lowercase().contains(&needle)
                || t.city.to_lowercase().contains(&needle)
                || t.venue
                    .as_deref()
                    .is_some_and(|v| v.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }

    #[tracing::instrument(skip(self, items), fields(total = items.len()))]
    pub fn apply<'a>(&self, items: &'a [Tournament]) -> Vec<&'a Tournament> {
        let kept: Vec<&Tournament> = items.iter().filter(|t| self.matches(t)).collect();
        trace!(kept = kept.len(), "applied filter");
        kept
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::Filter;
    use crate::event::{Level, Region, Tournament};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn tournament(name: &str, region: Region, start: NaiveDate, end: NaiveDate) -> Tournament {
        let mut t = Tournament::new_submission(
            name.to_string(),
            "Orlando".to_string(),
            region,
            Level::AllLevels,
            start,
            Some(end),
            Utc::now(),
        )
        .expect("valid tournament");
        t.categories = vec!["Open".to_string()];
        t
    }

    #[test]
    fn empty_filter_matches_everything() {
        let t = tournament(
            "Citrus Open",
            Region::CentralFlorida,
            date(2026, 3, 14),
            date(2026, 3, 15),
        );
        assert!(Filter::default().matches(&t));
    }

    #[test]
    fn region_and_featured_narrow_the_list() {
        let mut a = tournament(
            "Citrus Open",
            Region::CentralFlorida,
            date(2026, 3, 14),
            date(2026, 3, 15),
        );
        a.featured = true;
        let b = tournament(
            "Gulf Smash",
            Region::TampaBay,
            date(2026, 3, 14),
            date(2026, 3, 15),
        );

        let filter = Filter {
            region: Some(Region::CentralFlorida),
            featured_only: true,
            ..Filter::default()
        };
        assert!(filter.matches(&a));
        assert!(!filter.matches(&b));
    }

    #[test]
    fn date_window_uses_interval_overlap() {
        let t = tournament(
            "Spanning",
            Region::Panhandle,
            date(2026, 3, 30),
            date(2026, 4, 2),
        );

        let overlapping = Filter {
            from: Some(date(2026, 4, 1)),
            until: Some(date(2026, 4, 30)),
            ..Filter::default()
        };
        assert!(overlapping.matches(&t));

        let disjoint = Filter {
            until: Some(date(2026, 3, 29)),
            ..Filter::default()
        };
        assert!(!disjoint.matches(&t));
    }

    #[test]
    fn text_search_covers_name_city_and_venue() {
        let mut t = tournament(
            "Citrus Open",
            Region::CentralFlorida,
            date(2026, 3, 14),
            date(2026, 3, 15),
        );
        t.venue = Some("Lakeview Courts".to_string());

        for needle in ["citrus", "orlando", "lakeview"] {
            let filter = Filter {
                text: Some(needle.to_string()),
                ..Filter::default()
            };
            assert!(filter.matches(&t), "needle {needle}");
        }

        let miss = Filter {
            text: Some("miami".to_string()),
            ..Filter::default()
        };
        assert!(!miss.matches(&t));
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let t = tournament(
            "Citrus Open",
            Region::CentralFlorida,
            date(2026, 3, 14),
            date(2026, 3, 15),
        );
        let filter = Filter {
            category: Some("open".to_string()),
            ..Filter::default()
        };
        assert!(filter.matches(&t));
    }
}
