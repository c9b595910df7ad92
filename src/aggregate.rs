//! Multi-game rollups: the sample-reliability filter, cross-player
//! best-single-game leaderboards, and per-player aggregates.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::game_stats::{PlayerSingleGameStats, SingleGameStats};
use crate::model::{ClassType, GameResult, SIXES_COMBAT_CLASSES};
use crate::stat_registry::{StatScalar, StatValue};

pub const LOW_DPM: f64 = 130.0;
pub const LOW_HPM: f64 = 400.0;

/// Whether a single player-game is trustworthy enough to average.
pub fn is_reliable_sample(stats: &PlayerSingleGameStats) -> bool {
    // Played less than half the game: subbed in late, not representative.
    if stats.total_playtime_secs < 0.5 * stats.game_duration_secs {
        return false;
    }
    // Low dpm *and* low hpm: the player left mid-game but the log kept
    // counting the remaining duration against near-zero output.
    if stats.average_dpm <= LOW_DPM && stats.average_hpm <= LOW_HPM {
        return false;
    }
    true
}

#[derive(Debug, Clone)]
pub struct MaxStatWinner {
    pub steam_id: String,
    pub value: StatValue,
}

/// The tied top performers for one metric across a batch of games.
#[derive(Debug, Clone)]
pub struct MaxStat {
    pub name: &'static str,
    pub winners: Vec<MaxStatWinner>,
}

impl MaxStat {
    fn scan(
        name: &'static str,
        records: &[&PlayerSingleGameStats],
        get: impl Fn(&PlayerSingleGameStats) -> f64,
    ) -> Self {
        let mut best = 0.0_f64;
        let mut winners: Vec<MaxStatWinner> = Vec::new();
        for record in records {
            let value = get(record);
            if value > best {
                best = value;
                winners.clear();
                winners.push(Self::winner(name, record, value));
            } else if value == best {
                // Exact ties all count as co-winners.
                winners.push(Self::winner(name, record, value));
            }
        }
        Self { name, winners }
    }

    fn winner(name: &'static str, record: &PlayerSingleGameStats, value: f64) -> MaxStatWinner {
        MaxStatWinner {
            steam_id: record.steam_id.clone(),
            value: StatValue {
                name: name.to_string(),
                value: StatScalar::Number(value),
                log_id: record.log_id,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResultCounts {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl GameResultCounts {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Tie => self.ties += 1,
        }
    }

    pub fn total(self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn decided(self) -> u32 {
        self.wins + self.losses
    }
}

/// One player's multi-match rollup. `None` numeric fields mean "no qualifying
/// games", which the sheet renders blank rather than zero.
#[derive(Debug, Clone)]
pub struct PlayerAggregatedStats {
    pub steam_id: String,
    /// Damage per minute, averaged over combat-class games only.
    pub average_dpm: Option<f64>,
    /// Heals per minute, averaged over medic games only.
    pub average_hpm: Option<f64>,
    /// Heals received per minute, averaged over combat-class games only.
    pub average_hrpm: Option<f64>,
    pub game_result_counts: GameResultCounts,
    pub per_class_dpm: HashMap<ClassType, Option<f64>>,
    pub win_rate: Option<f64>,
}

impl PlayerAggregatedStats {
    /// Roll up all of one player's single-game records. The group must be
    /// non-empty and single-player; the grouping in [`AggregatedStats::new`]
    /// guarantees both.
    pub fn from_games(records: &[&PlayerSingleGameStats]) -> Self {
        assert!(!records.is_empty(), "player aggregate over empty group");
        let steam_id = records[0].steam_id.clone();
        assert!(
            records.iter().all(|r| r.steam_id == steam_id),
            "mixed players in one aggregate group"
        );

        let mut total_dpm = 0.0;
        let mut total_hpm = 0.0;
        let mut total_hrpm = 0.0;
        let mut combat_games = 0u32;
        let mut medic_games = 0u32;
        let mut per_class_total_dpm: HashMap<ClassType, f64> = HashMap::new();
        let mut per_class_games: HashMap<ClassType, u32> = HashMap::new();
        let mut game_result_counts = GameResultCounts::default();

        for record in records {
            if !is_reliable_sample(record) {
                continue;
            }

            game_result_counts.record(record.game_result);
            if record.class_type == ClassType::Medic {
                total_hpm += record.average_hpm;
                medic_games += 1;
            } else {
                total_dpm += record.average_dpm;
                total_hrpm += record.average_hrpm;
                combat_games += 1;
            }

            if SIXES_COMBAT_CLASSES.contains(&record.class_type) {
                *per_class_total_dpm.entry(record.class_type).or_default() += record.average_dpm;
                *per_class_games.entry(record.class_type).or_default() += 1;
            }
        }

        let average =
            |total: f64, games: u32| (games > 0).then(|| total / f64::from(games));
        let per_class_dpm = SIXES_COMBAT_CLASSES
            .iter()
            .map(|class| {
                let games = per_class_games.get(class).copied().unwrap_or(0);
                let total = per_class_total_dpm.get(class).copied().unwrap_or(0.0);
                (*class, average(total, games))
            })
            .collect();

        let win_rate = (game_result_counts.decided() > 0)
            .then(|| f64::from(game_result_counts.wins) / f64::from(game_result_counts.decided()));

        Self {
            steam_id,
            average_dpm: average(total_dpm, combat_games),
            average_hpm: average(total_hpm, medic_games),
            average_hrpm: average(total_hrpm, combat_games),
            game_result_counts,
            per_class_dpm,
            win_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatedStats {
    pub max_stats: Vec<MaxStat>,
    pub player_stats: BTreeMap<String, PlayerAggregatedStats>,
}

impl AggregatedStats {
    /// Flatten all games' player records, keep tracked identities, then run
    /// two independent passes: leaderboards over the flattened set, and
    /// filtered per-player rollups.
    pub fn new(all_game_stats: &[SingleGameStats], tracked_ids: &HashSet<String>) -> Self {
        let mut tracked: Vec<&PlayerSingleGameStats> = all_game_stats
            .iter()
            .flat_map(|game| game.player_stats.iter())
            .filter(|record| tracked_ids.contains(&record.steam_id))
            .collect();
        tracked.sort_by(|a, b| a.steam_id.cmp(&b.steam_id));

        let max_stats = vec![
            MaxStat::scan("Max DPM", &tracked, |s| s.average_dpm),
            MaxStat::scan("Max HPM", &tracked, |s| s.average_hpm),
            MaxStat::scan("Max Kills", &tracked, |s| s.kills),
            MaxStat::scan("Max Airshots", &tracked, |s| s.airshots),
            MaxStat::scan("Max Captures", &tracked, |s| s.captures),
        ];

        let mut groups: BTreeMap<String, Vec<&PlayerSingleGameStats>> = BTreeMap::new();
        for record in &tracked {
            groups
                .entry(record.steam_id.clone())
                .or_default()
                .push(record);
        }
        let player_stats = groups
            .into_iter()
            .map(|(steam_id, records)| {
                let aggregated = PlayerAggregatedStats::from_games(&records);
                (steam_id, aggregated)
            })
            .collect();

        Self {
            max_stats,
            player_stats,
        }
    }

    pub fn has_stats(&self) -> bool {
        !self.player_stats.is_empty()
    }
}
