//! On-disk cache of raw log JSON, one file per log id. Raw logs are the only
//! thing persisted between runs; all computed stats are rebuilt from them.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

const CACHE_DIR: &str = "pugstats";

#[derive(Debug, Clone)]
pub struct LogCache {
    dir: PathBuf,
}

impl LogCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_dir() -> Option<PathBuf> {
        if let Ok(base) = std::env::var("XDG_CACHE_HOME")
            && !base.trim().is_empty()
        {
            return Some(PathBuf::from(base).join(CACHE_DIR).join("logs"));
        }
        let home = std::env::var("HOME").ok()?;
        if home.trim().is_empty() {
            return None;
        }
        Some(
            PathBuf::from(home)
                .join(".cache")
                .join(CACHE_DIR)
                .join("logs"),
        )
    }

    /// A cached log, or `None` when absent or unreadable (unreadable entries
    /// are simply refetched).
    pub fn load(&self, log_id: u64) -> Option<Value> {
        let raw = fs::read_to_string(self.log_path(log_id)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn store(&self, log_id: u64, log: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir {}", self.dir.display()))?;
        let path = self.log_path(log_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(log).context("serialize cached log")?;
        fs::write(&tmp, json).with_context(|| format!("write cached log {log_id}"))?;
        fs::rename(&tmp, &path).with_context(|| format!("swap cached log {log_id}"))?;
        Ok(())
    }

    fn log_path(&self, log_id: u64) -> PathBuf {
        self.dir.join(format!("{log_id}.json"))
    }
}

/// The upload date recorded inside a log body. A cached copy whose date is
/// older than the metadata's date was re-uploaded and must be refetched.
pub fn cached_log_date(log: &Value) -> Option<i64> {
    log.get("info")
        .and_then(|info| info.get("date"))
        .and_then(Value::as_i64)
}
