use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, Local, NaiveDate};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::calendar::MonthLayout;
use crate::config::Config;
use crate::event::Tournament;

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 14;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self { color: cfg.color }
    }

    #[tracing::instrument(skip(self, items))]
    pub fn print_tournament_table(&mut self, items: &[&Tournament]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Slug".to_string(),
            "Dates".to_string(),
            "Name".to_string(),
            "Location".to_string(),
            "Level".to_string(),
            "Fee".to_string(),
        ];

        let mut rows = Vec::with_capacity(items.len());
        for t in items {
            let slug = if t.featured {
                self.paint(&t.slug, "33")
            } else {
                t.slug.clone()
            };
            rows.push(vec![
                slug,
                t.date_label(),
                t.name.clone(),
                format!("{}, {}", t.city, t.region),
                t.level.to_string(),
                t.fee_label(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, t))]
    pub fn print_tournament_info(&mut self, t: &Tournament) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id         {}", t.id)?;
        writeln!(out, "slug       {}", t.slug)?;
        writeln!(out, "name       {}", t.name)?;
        writeln!(out, "status     {:?}", t.status)?;
        writeln!(out, "dates      {}", t.date_label())?;
        writeln!(out, "city       {}", t.city)?;
        if let Some(venue) = &t.venue {
            writeln!(out, "venue      {venue}")?;
        }
        writeln!(out, "region     {}", t.region)?;
        writeln!(out, "level      {}", t.level)?;
        if !t.categories.is_empty() {
            writeln!(out, "categories {}", t.categories.join(", "))?;
        }
        writeln!(out, "featured   {}", t.featured)?;
        if let Some(url) = &t.registration_url {
            writeln!(out, "register   {url}")?;
        }
        let fee = t.fee_label();
        if !fee.is_empty() {
            writeln!(out, "entry fee  {fee}")?;
        }
        writeln!(out, "created    {}", t.created.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "modified   {}", t.modified.format("%Y-%m-%d %H:%M:%S"))?;

        Ok(())
    }

    /// Draws the month grid: day-number rows, one row per visible track with
    /// bars spanning their columns, and a "+N more" line when a week
    /// overflowed the track cap.
    #[tracing::instrument(skip(self, layout, tournaments))]
    pub fn print_month_calendar(
        &mut self,
        layout: &MonthLayout,
        tournaments: &[&Tournament],
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let by_id: HashMap<String, &Tournament> = tournaments
            .iter()
            .map(|t| (t.id.to_string(), *t))
            .collect();
        let today = Local::now().date_naive();

        let title = month_title(&layout.grid)?;
        let total_width = CELL_WIDTH * 7;
        let pad = total_width.saturating_sub(title.len()) / 2;
        writeln!(out, "{}{}", " ".repeat(pad), title)?;

        for label in DAY_LABELS {
            write!(out, "{label:<CELL_WIDTH$}")?;
        }
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(total_width))?;

        for (week, week_layout) in layout.grid.weeks().iter().zip(&layout.weeks) {
            for date in week.days() {
                let cell = self.day_cell(*date, layout.grid.in_month(*date), today);
                write_padded(&mut out, &cell, CELL_WIDTH)?;
            }
            writeln!(out)?;

            let track_count = week_layout
                .bars
                .iter()
                .map(|b| b.track + 1)
                .max()
                .unwrap_or(0);
            for track in 0..track_count {
                let mut col = 0;
                for bar in week_layout.bars.iter().filter(|b| b.track == track) {
                    while col < bar.start_col {
                        write!(out, "{:CELL_WIDTH$}", "")?;
                        col += 1;
                    }
                    let name = by_id
                        .get(&bar.event_id)
                        .map(|t| t.name.as_str())
                        .unwrap_or(bar.event_id.as_str());
                    let featured = by_id.get(&bar.event_id).is_some_and(|t| t.featured);
                    let cell = self.bar_cell(name, featured, bar.span * CELL_WIDTH);
                    write_padded(&mut out, &cell, bar.span * CELL_WIDTH)?;
                    col += bar.span;
                }
                writeln!(out)?;
            }

            if week_layout.overflow > 0 {
                let more = self.paint(&format!("+{} more", week_layout.overflow), "90");
                writeln!(out, "{more}")?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    fn day_cell(&self, date: NaiveDate, in_month: bool, today: NaiveDate) -> String {
        let number = format!("{:>2}", date.day());
        if date == today {
            self.paint(&number, "33")
        } else if !in_month {
            self.paint(&number, "90")
        } else {
            number
        }
    }

    fn bar_cell(&self, name: &str, featured: bool, width: usize) -> String {
        // One trailing space so adjacent bars never touch.
        let text = format!("[{}", truncate_to_width(name, width.saturating_sub(2)));
        let code = if featured { "33" } else { "32" };
        self.paint(&text, code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn month_title(grid: &crate::calendar::MonthGrid) -> anyhow::Result<String> {
    let first = NaiveDate::from_ymd_opt(grid.year(), grid.month(), 1)
        .ok_or_else(|| anyhow::anyhow!("grid month out of range"))?;
    Ok(first.format("%B %Y").to_string())
}

fn write_padded<W: Write>(mut writer: W, cell: &str, width: usize) -> anyhow::Result<()> {
    let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
    let padding = width.saturating_sub(visible);
    write!(writer, "{}{}", cell, " ".repeat(padding))?;
    Ok(())
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            write_padded(&mut writer, cell, widths[idx])?;
            write!(writer, " ")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
