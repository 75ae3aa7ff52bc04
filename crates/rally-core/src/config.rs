use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::calendar::DEFAULT_VISIBLE_TRACKS;

const CONFIG_ENV_VAR: &str = "RALLY_CONFIG";
const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "rally";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the JSONL directory files live. Defaults to the platform data
    /// dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_color")]
    pub color: bool,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(skip)]
    pub loaded_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Bar rows per week before events collapse into "+N more". Weeks always
    /// start on Sunday; that is a fixed assumption, not a setting.
    #[serde(default = "default_tracks")]
    pub max_visible_tracks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            color: default_color(),
            calendar: CalendarConfig::default(),
            loaded_file: None,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_visible_tracks: default_tracks(),
        }
    }
}

fn default_color() -> bool {
    true
}

fn default_tracks() -> usize {
    DEFAULT_VISIBLE_TRACKS
}

impl Config {
    /// Loads the TOML config from `--config`, `$RALLY_CONFIG`, or the
    /// platform config dir, in that order. An explicitly named file must
    /// exist; the discovered default may be absent.
    #[tracing::instrument(skip(override_path))]
    pub fn load(override_path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit_config_path(override_path) {
            return Self::load_file(&path);
        }

        if let Some(path) = default_config_path()
            && path.exists()
        {
            return Self::load_file(&path);
        }

        warn!("no config file found; using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        let path = expand_tilde(path);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        cfg.loaded_file = Some(path.clone());
        info!(config = %path.display(), "loaded config");
        Ok(cfg)
    }
}

#[tracing::instrument(skip(cfg, override_dir))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        path.to_path_buf()
    } else if let Some(configured) = &cfg.data_dir {
        expand_tilde(configured)
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

fn explicit_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(CONFIG_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    None
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir().context("cannot determine platform data directory")?;
    Ok(base.join(APP_DIR))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
