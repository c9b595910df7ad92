//! Per-match stat building: the two stat registries (game-level and
//! player-level), the typed records they produce, and the scrim classifier.

use std::collections::HashSet;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::model::{ClassType, GameResult, Team};
use crate::stat_registry::{LogId, StatDefinition, StatScalar, StatSet, evaluate};

/// Game-level registry, evaluated once per log.
pub static GAME_STAT_DEFS: Lazy<Vec<StatDefinition>> = Lazy::new(|| {
    vec![
        StatDefinition::raw_number("duration", "length"),
        StatDefinition::new("winning_team", |_, log| {
            Ok(StatScalar::WinningSide(decide_winning_team(log)?))
        }),
    ]
});

/// Player-level registry, evaluated once per participant. The accumulator is
/// seeded with the game-level stats under a `game_` prefix, so derived
/// definitions like `game_result` can reference the match's winning side.
pub static PLAYER_STAT_DEFS: Lazy<Vec<StatDefinition>> = Lazy::new(|| {
    vec![
        // base extractors
        StatDefinition::raw_number("damage", "dmg"),
        StatDefinition::raw_number("heals", "heal"),
        StatDefinition::raw_number("heals_received", "hr"),
        StatDefinition::raw_number("kills", "kills"),
        StatDefinition::raw_number("assists", "assists"),
        StatDefinition::raw_number("deaths", "deaths"),
        StatDefinition::raw_number("airshots", "as"),
        StatDefinition::raw_number("captures", "cpc"),
        StatDefinition::new("team", |_, raw| {
            let raw_team = raw
                .get("team")
                .and_then(Value::as_str)
                .context("player log missing `team`")?;
            let team = Team::from_log_name(raw_team)
                .with_context(|| format!("unrecognized team `{raw_team}`"))?;
            Ok(StatScalar::Side(team))
        }),
        StatDefinition::new("class_type", |_, raw| Ok(StatScalar::Role(main_class(raw)?))),
        StatDefinition::new("total_playtime_in_seconds", |_, raw| {
            let total = played_class_entries(raw)?
                .iter()
                .map(|(_, time)| time)
                .sum();
            Ok(StatScalar::Number(total))
        }),
        // derived stats
        StatDefinition::new("game_result", |stats, _| {
            let result = match stats.winning_side("game_winning_team")? {
                None => GameResult::Tie,
                Some(winner) if winner == stats.side("team")? => GameResult::Win,
                Some(_) => GameResult::Loss,
            };
            Ok(StatScalar::Outcome(result))
        }),
        StatDefinition::new("average_dpm", |stats, _| per_minute(stats, "damage")),
        StatDefinition::new("average_hpm", |stats, _| per_minute(stats, "heals")),
        StatDefinition::new("average_hrpm", |stats, _| per_minute(stats, "heals_received")),
    ]
});

fn per_minute(stats: &StatSet, name: &str) -> Result<StatScalar> {
    let minutes = stats.number("game_duration")? / 60.0;
    Ok(StatScalar::Number(stats.number(name)? / minutes))
}

fn side_score(log: &Value, side: Team) -> Result<i64> {
    log.get("teams")
        .and_then(|teams| teams.get(side.log_name()))
        .and_then(|team| team.get("score"))
        .and_then(Value::as_i64)
        .with_context(|| format!("log missing `teams.{}.score`", side.log_name()))
}

fn decide_winning_team(log: &Value) -> Result<Option<Team>> {
    let red = side_score(log, Team::Red)?;
    let blue = side_score(log, Team::Blue)?;
    Ok(if red == blue {
        None
    } else if red > blue {
        Some(Team::Red)
    } else {
        Some(Team::Blue)
    })
}

/// The per-class playtime breakdown, minus `undefined`/`unknown` entries.
/// Those show up when a player idles in spectate before joining and would
/// otherwise dominate the playtime numbers.
fn played_class_entries(player_log: &Value) -> Result<Vec<(&str, f64)>> {
    let entries = player_log
        .get("class_stats")
        .and_then(Value::as_array)
        .context("player log missing `class_stats`")?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .context("class_stats entry missing `type`")?;
        if kind == "undefined" || kind == "unknown" {
            continue;
        }
        let total_time = entry
            .get("total_time")
            .and_then(Value::as_f64)
            .with_context(|| format!("class_stats entry for `{kind}` missing `total_time`"))?;
        out.push((kind, total_time));
    }
    Ok(out)
}

/// The class is whatever single class had the highest playtime.
fn main_class(player_log: &Value) -> Result<ClassType> {
    let entries = played_class_entries(player_log)?;
    let (kind, _) = entries
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .context("no played classes in `class_stats`")?;
    ClassType::from_log_name(kind).with_context(|| format!("unrecognized class `{kind}`"))
}

#[derive(Debug, Clone)]
pub struct SingleGameStats {
    pub log_id: LogId,
    pub duration_secs: f64,
    /// `None` when the side scores were equal.
    pub winning_team: Option<Team>,
    pub stats: StatSet,
    pub player_stats: Vec<PlayerSingleGameStats>,
}

impl SingleGameStats {
    pub fn from_log(log_id: LogId, log: &Value) -> Result<Self> {
        let stats = evaluate(&GAME_STAT_DEFS, log_id, log, StatSet::new())
            .with_context(|| format!("log {log_id}: game stats"))?;
        let duration_secs = stats.number("duration")?;
        let winning_team = stats.winning_side("winning_team")?;

        let players = log
            .get("players")
            .and_then(Value::as_object)
            .with_context(|| format!("log {log_id} missing `players`"))?;
        let mut player_stats = Vec::with_capacity(players.len());
        for (steam_id, player_log) in players {
            player_stats.push(
                PlayerSingleGameStats::from_player_log(log_id, &stats, steam_id, player_log)
                    .with_context(|| format!("log {log_id}: player {steam_id}"))?,
            );
        }

        Ok(Self {
            log_id,
            duration_secs,
            winning_team,
            stats,
            player_stats,
        })
    }

    /// A game with at least `threshold` roster members on the same side is an
    /// organized scrim rather than a pickup game.
    pub fn is_scrim(&self, roster_ids: &HashSet<String>, threshold: usize) -> bool {
        Team::ALL.iter().any(|side| {
            let count = self
                .player_stats
                .iter()
                .filter(|p| p.team == *side && roster_ids.contains(&p.steam_id))
                .count();
            count >= threshold
        })
    }
}

/// One player's computed stats for one match. The typed fields are extracted
/// once at construction (failing loudly on any registry misconfiguration);
/// `stats` keeps the provenance-tagged values behind them.
#[derive(Debug, Clone)]
pub struct PlayerSingleGameStats {
    pub log_id: LogId,
    pub steam_id: String,
    pub class_type: ClassType,
    pub team: Team,
    pub game_result: GameResult,
    pub total_playtime_secs: f64,
    pub game_duration_secs: f64,
    pub average_dpm: f64,
    pub average_hpm: f64,
    pub average_hrpm: f64,
    pub kills: f64,
    pub assists: f64,
    pub deaths: f64,
    pub airshots: f64,
    pub captures: f64,
    pub stats: StatSet,
}

impl PlayerSingleGameStats {
    pub fn from_player_log(
        log_id: LogId,
        game_stats: &StatSet,
        steam_id: &str,
        player_log: &Value,
    ) -> Result<Self> {
        let seed = game_stats.clone().into_prefixed("game_");
        let stats = evaluate(&PLAYER_STAT_DEFS, log_id, player_log, seed)?;

        Ok(Self {
            log_id,
            steam_id: steam_id.to_string(),
            class_type: stats.role("class_type")?,
            team: stats.side("team")?,
            game_result: stats.outcome("game_result")?,
            total_playtime_secs: stats.number("total_playtime_in_seconds")?,
            game_duration_secs: stats.number("game_duration")?,
            average_dpm: stats.number("average_dpm")?,
            average_hpm: stats.number("average_hpm")?,
            average_hrpm: stats.number("average_hrpm")?,
            kills: stats.number("kills")?,
            assists: stats.number("assists")?,
            deaths: stats.number("deaths")?,
            airshots: stats.number("airshots")?,
            captures: stats.number("captures")?,
            stats,
        })
    }
}
