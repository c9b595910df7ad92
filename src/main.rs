use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use rayon::prelude::*;
use rust_xlsxwriter::Workbook;

use pugstats::aggregate::AggregatedStats;
use pugstats::config::Config;
use pugstats::game_stats::SingleGameStats;
use pugstats::http_client::http_client;
use pugstats::log_cache::LogCache;
use pugstats::logs_fetch::{self, LogMetadata};
use pugstats::sheet_export::append_stats_sheet;
use pugstats::time_bounds::{TimeBounds, month_label};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env()?;
    let aliases = config.load_aliases()?;
    let tracked: HashSet<String> = aliases.keys().cloned().collect();
    let cache = LogCache::new(config.cache_dir.clone());

    let client = http_client()?;
    let metadata = logs_fetch::fetch_uploader_log_metadata(client, &config.uploader_id)?;
    println!(
        "Fetched metadata for {} logs (uploader {})",
        metadata.len(),
        config.uploader_id
    );

    let today = Utc::now();
    let current_year = today.year();
    let current_month = today.month();

    let mut workbook = Workbook::new();

    let all_time = TimeBounds::new(
        TimeBounds::for_month(config.start_year, config.start_month)?.start,
        TimeBounds::for_month(current_year, current_month)?.end,
    );
    update_stats_for_bounds(
        &mut workbook,
        "All-Time",
        &all_time,
        &metadata,
        &cache,
        &config,
        &tracked,
        &aliases,
    )?;

    for year in config.start_year..=current_year {
        for month in 1..=12u32 {
            // Skip the months in the first year before pugs started.
            if year == config.start_year && month < config.start_month {
                continue;
            }
            if year == current_year && month > current_month {
                break;
            }
            let label = month_label(year, month)?;
            update_stats_for_bounds(
                &mut workbook,
                &label,
                &TimeBounds::for_month(year, month)?,
                &metadata,
                &cache,
                &config,
                &tracked,
                &aliases,
            )?;
        }
    }

    workbook
        .save(&config.output_path)
        .with_context(|| format!("failed writing workbook to {}", config.output_path.display()))?;
    println!("Wrote {}", config.output_path.display());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn update_stats_for_bounds(
    workbook: &mut Workbook,
    sheet_name: &str,
    bounds: &TimeBounds,
    metadata: &[LogMetadata],
    cache: &LogCache,
    config: &Config,
    tracked: &HashSet<String>,
    aliases: &HashMap<String, String>,
) -> Result<()> {
    println!("Processing stats for {sheet_name}");

    let in_range = logs_fetch::filter_metadata_in_range(metadata, bounds);
    let logs = logs_fetch::fetch_logs(http_client()?, cache, &in_range)?;
    println!("\tDone fetching {} logs", logs.len());

    let mut games = logs
        .par_iter()
        .map(|(log_id, log)| SingleGameStats::from_log(*log_id, log))
        .collect::<Result<Vec<_>>>()?;
    games.retain(|game| !game.is_scrim(&config.roster_ids, config.scrim_threshold));

    let aggregated = AggregatedStats::new(&games, tracked);
    if !aggregated.has_stats() {
        println!("\tNo tracked players played in this window; skipping sheet");
        return Ok(());
    }
    println!(
        "\tDone aggregating {} players over {} non-scrim games",
        aggregated.player_stats.len(),
        games.len()
    );

    append_stats_sheet(workbook, sheet_name, &aggregated, aliases)
}
