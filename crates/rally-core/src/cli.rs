use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::event::{Level, Region};

#[derive(Parser, Debug)]
#[command(
    name = "rally",
    version,
    about = "Regional tournament directory with a terminal calendar",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config file (defaults to $RALLY_CONFIG, then the platform config dir)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the directory files
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a tournament for review
    Add(AddArgs),

    /// List published tournaments
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show submissions awaiting review
    Queue,

    /// Approve pending submissions (by slug or id prefix)
    Approve {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Reject pending submissions (by slug or id prefix)
    Reject {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Remove a published tournament
    Remove { key: String },

    /// Show one tournament in full
    Info { key: String },

    /// Render a month of tournaments as a calendar grid
    Calendar {
        /// Month to render as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// Override the configured bar rows per week
        #[arg(long)]
        tracks: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub name: String,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day; omit for a single-day event
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long)]
    pub city: String,

    #[arg(long, value_enum)]
    pub region: Region,

    #[arg(long, value_enum, default_value_t = Level::AllLevels)]
    pub level: Level,

    #[arg(long)]
    pub venue: Option<String>,

    /// May be given more than once
    #[arg(long = "category", action = ArgAction::Append)]
    pub categories: Vec<String>,

    #[arg(long)]
    pub featured: bool,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub fee_min: Option<u32>,

    #[arg(long)]
    pub fee_max: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long, value_enum)]
    pub region: Option<Region>,

    #[arg(long, value_enum)]
    pub level: Option<Level>,

    #[arg(long)]
    pub category: Option<String>,

    /// Featured tournaments only
    #[arg(long)]
    pub featured: bool,

    /// Keep tournaments ending on or after this date
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep tournaments starting on or before this date
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Substring match against name, city, and venue
    #[arg(long)]
    pub search: Option<String>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = match (quiet, verbose) {
        (q, _) if q >= 2 => "error",
        (1, _) => "warn",
        (_, v) if v >= 3 => "trace",
        (_, 2) => "debug",
        (_, 1) => "info",
        _ => "warn",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};
    use crate::event::Region;

    #[test]
    fn add_parses_dates_and_enums() {
        let cli = Cli::parse_from([
            "rally",
            "add",
            "Citrus Open",
            "--start",
            "2026-03-14",
            "--end",
            "2026-03-15",
            "--city",
            "Orlando",
            "--region",
            "central-florida",
            "--level",
            "pro-open",
            "--category",
            "Open",
            "--category",
            "Mixed",
            "--featured",
        ]);

        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.name, "Citrus Open");
                assert_eq!(args.start.to_string(), "2026-03-14");
                assert_eq!(
                    args.end.map(|d| d.to_string()).as_deref(),
                    Some("2026-03-15")
                );
                assert_eq!(args.region, Region::CentralFlorida);
                assert_eq!(args.categories, ["Open", "Mixed"]);
                assert!(args.featured);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn calendar_takes_month_and_filter_flags() {
        let cli = Cli::parse_from([
            "rally",
            "calendar",
            "--month",
            "2026-03",
            "--tracks",
            "2",
            "--region",
            "tampa-bay",
            "--featured",
        ]);

        match cli.command {
            Command::Calendar {
                month,
                tracks,
                filter,
            } => {
                assert_eq!(month.as_deref(), Some("2026-03"));
                assert_eq!(tracks, Some(2));
                assert_eq!(filter.region, Some(Region::TampaBay));
                assert!(filter.featured);
            }
            other => panic!("expected calendar, got {other:?}"),
        }
    }

    #[test]
    fn approve_requires_at_least_one_key() {
        assert!(Cli::try_parse_from(["rally", "approve"]).is_err());
    }
}
