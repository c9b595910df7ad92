//! logs.tf ingestion: uploader log metadata, 6v6 filtering, and cached log
//! bodies. Everything downstream of here is pure computation.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::log_cache::{LogCache, cached_log_date};
use crate::time_bounds::TimeBounds;

const LOGS_API_BASE: &str = "https://logs.tf/api/v1";
const METADATA_LIMIT: u32 = 10_000;
// Spacing between uncached fetches; logs.tf rate-limits bursts.
const FETCH_SPACING: Duration = Duration::from_millis(200);
// 6v6 rosters, allowing for subs joining mid-game.
const MIN_PLAYERS: u32 = 12;
const MAX_PLAYERS: u32 = 18;

#[derive(Debug, Clone, Deserialize)]
pub struct LogMetadata {
    pub id: u64,
    pub date: i64,
    #[serde(default)]
    pub players: u32,
}

#[derive(Debug, Deserialize)]
struct LogListResponse {
    logs: Vec<LogMetadata>,
}

pub fn fetch_uploader_log_metadata(client: &Client, uploader_id: &str) -> Result<Vec<LogMetadata>> {
    let url = format!("{LOGS_API_BASE}/log?uploader={uploader_id}&limit={METADATA_LIMIT}");
    let body = fetch_body(client, &url).context("log list request failed")?;
    let parsed: LogListResponse =
        serde_json::from_str(&body).context("invalid log list json")?;
    Ok(parsed.logs)
}

/// Keep 6v6-sized games inside the window.
pub fn filter_metadata_in_range<'a>(
    metadata: &'a [LogMetadata],
    bounds: &TimeBounds,
) -> Vec<&'a LogMetadata> {
    metadata
        .iter()
        .filter(|m| m.players >= MIN_PLAYERS && m.players < MAX_PLAYERS && bounds.contains(m.date))
        .collect()
}

/// Fetch the full log body for each metadata entry, serving from the cache
/// where the cached copy is still current.
pub fn fetch_logs(
    client: &Client,
    cache: &LogCache,
    metadata: &[&LogMetadata],
) -> Result<HashMap<u64, Value>> {
    let mut out = HashMap::with_capacity(metadata.len());
    let mut fetched_any = false;
    for entry in metadata {
        if let Some(cached) = cache.load(entry.id) {
            // A re-uploaded log carries a newer date in the metadata listing.
            if cached_log_date(&cached).is_some_and(|date| date >= entry.date) {
                out.insert(entry.id, cached);
                continue;
            }
        }
        if fetched_any {
            thread::sleep(FETCH_SPACING);
        }
        let log = fetch_log(client, entry.id)?;
        fetched_any = true;
        cache.store(entry.id, &log)?;
        out.insert(entry.id, log);
    }
    Ok(out)
}

fn fetch_log(client: &Client, log_id: u64) -> Result<Value> {
    let url = format!("{LOGS_API_BASE}/log/{log_id}");
    let body = fetch_body(client, &url).with_context(|| format!("log {log_id} request failed"))?;
    serde_json::from_str(&body).with_context(|| format!("log {log_id}: invalid json"))
}

fn fetch_body(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {body}"));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u64, date: i64, players: u32) -> LogMetadata {
        LogMetadata { id, date, players }
    }

    #[test]
    fn filters_by_player_count_and_date() {
        let metadata = vec![
            meta(1, 150, 12), // in
            meta(2, 150, 11), // too few players
            meta(3, 150, 18), // too many players
            meta(4, 99, 12),  // before the window
            meta(5, 201, 12), // after the window
            meta(6, 200, 17), // in, at both edges
        ];
        let bounds = TimeBounds::new(100, 200);
        let kept: Vec<u64> = filter_metadata_in_range(&metadata, &bounds)
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(kept, vec![1, 6]);
    }

    #[test]
    fn metadata_parses_with_missing_players() {
        let raw = r#"{"logs": [{"id": 1, "date": 100}, {"id": 2, "date": 101, "players": 12}]}"#;
        let parsed: LogListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.logs[0].players, 0);
        assert_eq!(parsed.logs[1].players, 12);
    }
}
