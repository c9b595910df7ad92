//! Run configuration: `PUGSTATS_*` environment variables (optionally via a
//! `.env` file) with the long-standing pug-night defaults baked in.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};

use crate::log_cache::LogCache;

const DEFAULT_UPLOADER_ID: &str = "76561198032283738";
const DEFAULT_ROSTER_IDS: &[&str] = &[
    "[U:1:106802962]",
    "[U:1:58527614]",
    "[U:1:95235270]",
    "[U:1:95386122]",
    "[U:1:87473885]",
    "[U:1:34750935]",
];
const DEFAULT_SCRIM_THRESHOLD: usize = 4;
// The month the pug group started playing.
const DEFAULT_START_YEAR: i32 = 2018;
const DEFAULT_START_MONTH: u32 = 6;
const DEFAULT_KEY_FILE: &str = "player_key.json";
const DEFAULT_OUTPUT: &str = "pug_stats.xlsx";

#[derive(Debug, Clone)]
pub struct Config {
    /// The logs.tf account whose uploads make up the pug history.
    pub uploader_id: String,
    /// Fixed roster used by the scrim classifier.
    pub roster_ids: HashSet<String>,
    pub scrim_threshold: usize,
    pub start_year: i32,
    pub start_month: u32,
    /// JSON map of steam id -> display name; its key set is the tracked set.
    pub key_file: PathBuf,
    pub output_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let uploader_id =
            env_nonempty("PUGSTATS_UPLOADER_ID").unwrap_or_else(|| DEFAULT_UPLOADER_ID.to_string());

        let roster_ids = match env_nonempty("PUGSTATS_ROSTER_IDS") {
            Some(raw) => parse_id_list(&raw),
            None => DEFAULT_ROSTER_IDS.iter().map(|s| s.to_string()).collect(),
        };

        let scrim_threshold = match env_nonempty("PUGSTATS_SCRIM_THRESHOLD") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("invalid PUGSTATS_SCRIM_THRESHOLD `{raw}`"))?,
            None => DEFAULT_SCRIM_THRESHOLD,
        };

        let (start_year, start_month) = match env_nonempty("PUGSTATS_START_MONTH") {
            Some(raw) => parse_year_month(&raw)
                .with_context(|| format!("invalid PUGSTATS_START_MONTH `{raw}` (want YYYY-MM)"))?,
            None => (DEFAULT_START_YEAR, DEFAULT_START_MONTH),
        };

        let key_file = env_nonempty("PUGSTATS_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));
        let output_path = env_nonempty("PUGSTATS_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let cache_dir = match env_nonempty("PUGSTATS_CACHE_DIR") {
            Some(raw) => PathBuf::from(raw),
            None => LogCache::default_dir().context("unable to resolve a log cache dir")?,
        };

        Ok(Self {
            uploader_id,
            roster_ids,
            scrim_threshold,
            start_year,
            start_month,
            key_file,
            output_path,
            cache_dir,
        })
    }

    /// Load the steam id -> display name key file.
    pub fn load_aliases(&self) -> Result<HashMap<String, String>> {
        let raw = fs::read_to_string(&self.key_file)
            .with_context(|| format!("failed reading key file {}", self.key_file.display()))?;
        let aliases: HashMap<String, String> =
            serde_json::from_str(&raw).context("invalid key file json")?;
        ensure!(
            !aliases.is_empty(),
            "key file {} has no players",
            self.key_file.display()
        );
        Ok(aliases)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn parse_id_list(raw: &str) -> HashSet<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.split_once('-')?;
    let year = year.trim().parse::<i32>().ok()?;
    let month = month.trim().parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}
