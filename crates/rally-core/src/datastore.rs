use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::event::{Status, Tournament};

/// JSONL-backed directory storage: submissions awaiting review in one file,
/// the published directory in the other.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub submissions_path: PathBuf,
    pub published_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let submissions_path = data_dir.join("submissions.data");
        let published_path = data_dir.join("published.data");

        if !submissions_path.exists() {
            fs::write(&submissions_path, "")?;
        }
        if !published_path.exists() {
            fs::write(&published_path, "")?;
        }

        info!(
            data_dir = %data_dir.display(),
            submissions = %submissions_path.display(),
            published = %published_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            submissions_path,
            published_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_submissions(&self) -> anyhow::Result<Vec<Tournament>> {
        load_jsonl(&self.submissions_path).context("failed to load submissions.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_published(&self) -> anyhow::Result<Vec<Tournament>> {
        load_jsonl(&self.published_path).context("failed to load published.data")
    }

    #[tracing::instrument(skip(self, items))]
    pub fn save_submissions(&self, items: &[Tournament]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.submissions_path, items).context("failed to save submissions.data")
    }

    #[tracing::instrument(skip(self, items))]
    pub fn save_published(&self, items: &[Tournament]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.published_path, items).context("failed to save published.data")
    }

    #[tracing::instrument(skip(self, tournament), fields(slug = %tournament.slug, id = %tournament.id))]
    pub fn add_submission(&self, tournament: Tournament) -> anyhow::Result<()> {
        let mut submissions = self.load_submissions()?;
        submissions.push(tournament);
        submissions.sort_by(|a, b| a.created.cmp(&b.created));
        self.save_submissions(&submissions)?;
        debug!(count = submissions.len(), "submission queued");
        Ok(())
    }

    /// Approves a pending submission: moves it into the published file with
    /// status `Approved`.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn publish(&self, id: Uuid, now: DateTime<Utc>) -> anyhow::Result<Tournament> {
        let mut submissions = self.load_submissions()?;
        let mut published = self.load_published()?;

        let idx = submissions
            .iter()
            .position(|t| t.id == id && t.status == Status::Pending)
            .ok_or_else(|| anyhow!("no pending submission with id {id}"))?;

        let mut tournament = submissions.remove(idx);
        tournament.status = Status::Approved;
        tournament.modified = now;
        published.push(tournament.clone());
        published.sort_by(|a, b| a.date_start.cmp(&b.date_start).then(a.slug.cmp(&b.slug)));

        self.save_submissions(&submissions)?;
        self.save_published(&published)?;
        Ok(tournament)
    }

    /// Marks a pending submission rejected. It stays in the submissions file
    /// so the decision is visible in the queue.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn reject(&self, id: Uuid, now: DateTime<Utc>) -> anyhow::Result<Tournament> {
        let mut submissions = self.load_submissions()?;
        let entry = submissions
            .iter_mut()
            .find(|t| t.id == id && t.status == Status::Pending)
            .ok_or_else(|| anyhow!("no pending submission with id {id}"))?;

        entry.status = Status::Rejected;
        entry.modified = now;
        let rejected = entry.clone();
        self.save_submissions(&submissions)?;
        Ok(rejected)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove_published(&self, id: Uuid) -> anyhow::Result<Tournament> {
        let mut published = self.load_published()?;
        let idx = published
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| anyhow!("no published tournament with id {id}"))?;

        let removed = published.remove(idx);
        self.save_published(&published)?;
        Ok(removed)
    }

    /// Slug uniqueness across both files; collisions get a numeric suffix the
    /// way the public site would dedupe URLs.
    pub fn unique_slug(&self, base: &str) -> anyhow::Result<String> {
        let submissions = self.load_submissions()?;
        let published = self.load_published()?;
        let taken = |candidate: &str| {
            submissions.iter().any(|t| t.slug == candidate)
                || published.iter().any(|t| t.slug == candidate)
        };

        if !taken(base) {
            return Ok(base.to_string());
        }
        for n in 2.. {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return Ok(candidate);
            }
        }
        unreachable!("suffix search is unbounded")
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Tournament>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tournament: Tournament = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(tournament);
    }

    debug!(count = out.len(), "loaded tournaments from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, items))]
fn save_jsonl_atomic(path: &Path, items: &[Tournament]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = items.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for item in items {
        let serialized = serde_json::to_string(item)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
