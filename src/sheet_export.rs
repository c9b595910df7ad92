//! xlsx rendering: one worksheet per time window, holding the per-player
//! aggregate table and the best-single-game leaderboard block. Undefined
//! stats render as blank cells, never zero.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Url, Workbook, Worksheet};

use crate::aggregate::{AggregatedStats, MaxStat, PlayerAggregatedStats};
use crate::model::SIXES_COMBAT_CLASSES;

const PLAYER_COLUMN_WIDTH: f64 = 24.0;
const STAT_COLUMN_WIDTH: f64 = 18.0;

pub fn append_stats_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    aggregated: &AggregatedStats,
    aliases: &HashMap<String, String>,
) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .with_context(|| format!("invalid sheet name `{sheet_name}`"))?;

    let bold = Format::new().set_bold();
    let two_dp = Format::new().set_num_format("0.00");
    let percent = Format::new().set_num_format("0.00%");

    let mut header = vec![
        "Player".to_string(),
        "Games Played".to_string(),
        "Average DPM".to_string(),
        "Average HPM".to_string(),
        "Average Heals Received/min".to_string(),
        "Win Rate".to_string(),
    ];
    for class in SIXES_COMBAT_CLASSES {
        header.push(format!("Average {} DPM", class.label()));
    }
    for (col, title) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &bold)?;
    }

    // Only aliased players are rendered, sorted the way the sheet reads.
    let mut rows: Vec<(&String, &PlayerAggregatedStats)> = aggregated
        .player_stats
        .iter()
        .filter_map(|(steam_id, stats)| aliases.get(steam_id).map(|alias| (alias, stats)))
        .collect();
    rows.sort_by_key(|(alias, _)| alias.to_lowercase());

    for (idx, (alias, stats)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, alias.as_str())?;
        sheet.write_number(row, 1, f64::from(stats.game_result_counts.total()))?;
        write_opt_number(sheet, row, 2, stats.average_dpm, &two_dp)?;
        write_opt_number(sheet, row, 3, stats.average_hpm, &two_dp)?;
        write_opt_number(sheet, row, 4, stats.average_hrpm, &two_dp)?;
        write_opt_number(sheet, row, 5, stats.win_rate, &percent)?;
        for (offset, class) in SIXES_COMBAT_CLASSES.iter().enumerate() {
            let value = stats.per_class_dpm.get(class).copied().flatten();
            write_opt_number(sheet, row, 6 + offset as u16, value, &two_dp)?;
        }
    }

    let leaderboard_start = rows.len() as u32 + 2;
    write_leaderboards(sheet, leaderboard_start, &aggregated.max_stats, aliases, &bold)?;

    sheet.set_freeze_panes(1, 1)?;
    sheet.set_column_width(0, PLAYER_COLUMN_WIDTH)?;
    for col in 1..header.len() as u16 {
        sheet.set_column_width(col, STAT_COLUMN_WIDTH)?;
    }

    Ok(())
}

fn write_opt_number(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> Result<()> {
    if let Some(value) = value {
        sheet.write_number_with_format(row, col, value, format)?;
    }
    Ok(())
}

/// One row per metric; each co-winner cell links back to the source log.
fn write_leaderboards(
    sheet: &mut Worksheet,
    start_row: u32,
    max_stats: &[MaxStat],
    aliases: &HashMap<String, String>,
    bold: &Format,
) -> Result<()> {
    sheet.write_string_with_format(start_row, 0, "Best Single Game", bold)?;
    for (idx, stat) in max_stats.iter().enumerate() {
        let row = start_row + 1 + idx as u32;
        sheet.write_string(row, 0, stat.name)?;
        for (offset, winner) in stat.winners.iter().enumerate() {
            let name = aliases
                .get(&winner.steam_id)
                .map(String::as_str)
                .unwrap_or(winner.steam_id.as_str());
            let value = winner.value.value.as_number().unwrap_or_default();
            let link = Url::new(format!("https://logs.tf/{}", winner.value.log_id))
                .set_text(format!("{name}, {}", format_stat_number(value)));
            sheet.write_url(row, 1 + offset as u16, link)?;
        }
    }
    Ok(())
}

fn format_stat_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
