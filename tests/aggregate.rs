use std::collections::HashSet;

use serde_json::{Map, Value, json};

use pugstats::aggregate::AggregatedStats;
use pugstats::game_stats::SingleGameStats;
use pugstats::model::ClassType;

fn player(team: &str, class: &str, dmg: u32, heal: u32, kills: u32) -> Value {
    json!({
        "team": team,
        "class_stats": [{"type": class, "total_time": 1800}],
        "kills": kills,
        "assists": 0,
        "deaths": 0,
        "dmg": dmg,
        "heal": heal,
        "hr": 0,
        "as": 0,
        "cpc": 0,
    })
}

/// A 30-minute log, so dpm == dmg / 30.
fn log(red_score: u32, blue_score: u32, players: Vec<(&str, Value)>) -> Value {
    let players: Map<String, Value> = players
        .into_iter()
        .map(|(id, p)| (id.to_string(), p))
        .collect();
    json!({
        "length": 1800,
        "teams": {"Red": {"score": red_score}, "Blue": {"score": blue_score}},
        "players": players,
        "info": {"date": 1529000000},
    })
}

fn build_games(logs: &[(u64, Value)]) -> Vec<SingleGameStats> {
    logs.iter()
        .map(|(id, log)| SingleGameStats::from_log(*id, log).unwrap())
        .collect()
}

fn tracked(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn tie_match_counts_no_wins_but_contributes_damage() {
    let games = build_games(&[(
        1,
        log(
            3,
            3,
            vec![
                ("[U:1:1]", player("Red", "soldier", 6000, 0, 20)),
                ("[U:1:2]", player("Red", "scout", 6000, 0, 20)),
                ("[U:1:3]", player("Blue", "soldier", 6000, 0, 20)),
                ("[U:1:4]", player("Blue", "demoman", 6000, 0, 20)),
            ],
        ),
    )]);
    let aggregated = AggregatedStats::new(
        &games,
        &tracked(&["[U:1:1]", "[U:1:2]", "[U:1:3]", "[U:1:4]"]),
    );

    assert_eq!(aggregated.player_stats.len(), 4);
    for stats in aggregated.player_stats.values() {
        assert_eq!(stats.game_result_counts.wins, 0);
        assert_eq!(stats.game_result_counts.losses, 0);
        assert_eq!(stats.game_result_counts.ties, 1);
        assert!(stats.win_rate.is_none());
        assert_eq!(stats.average_dpm, Some(200.0));
    }
}

#[test]
fn leaderboard_retains_all_tied_winners() {
    let games = build_games(&[
        (
            10,
            log(
                3,
                1,
                vec![
                    ("[U:1:1]", player("Red", "soldier", 9000, 0, 30)),
                    ("[U:1:2]", player("Blue", "scout", 7500, 0, 12)),
                ],
            ),
        ),
        (
            11,
            log(
                1,
                3,
                vec![
                    ("[U:1:2]", player("Red", "scout", 6000, 0, 30)),
                    ("[U:1:3]", player("Blue", "demoman", 6600, 0, 10)),
                ],
            ),
        ),
    ]);
    let aggregated = AggregatedStats::new(&games, &tracked(&["[U:1:1]", "[U:1:2]", "[U:1:3]"]));

    let max_kills = aggregated
        .max_stats
        .iter()
        .find(|s| s.name == "Max Kills")
        .unwrap();
    assert_eq!(max_kills.winners.len(), 2);
    let ids: Vec<&str> = max_kills
        .winners
        .iter()
        .map(|w| w.steam_id.as_str())
        .collect();
    assert!(ids.contains(&"[U:1:1]"));
    assert!(ids.contains(&"[U:1:2]"));
    assert!(
        max_kills
            .winners
            .iter()
            .all(|w| w.value.value.as_number() == Some(30.0))
    );
}

#[test]
fn leaderboard_winner_links_back_to_its_game() {
    let games = build_games(&[
        (
            20,
            log(
                3,
                1,
                vec![
                    ("[U:1:1]", player("Red", "soldier", 7500, 0, 10)),
                    ("[U:1:2]", player("Blue", "scout", 6000, 0, 10)),
                ],
            ),
        ),
        (
            21,
            log(
                1,
                3,
                vec![
                    ("[U:1:1]", player("Red", "soldier", 12000, 0, 10)),
                    ("[U:1:2]", player("Blue", "scout", 6000, 0, 10)),
                ],
            ),
        ),
    ]);
    let aggregated = AggregatedStats::new(&games, &tracked(&["[U:1:1]", "[U:1:2]"]));

    let max_dpm = aggregated
        .max_stats
        .iter()
        .find(|s| s.name == "Max DPM")
        .unwrap();
    assert_eq!(max_dpm.winners.len(), 1);
    let winner = &max_dpm.winners[0];
    assert_eq!(winner.steam_id, "[U:1:1]");
    assert_eq!(winner.value.value.as_number(), Some(400.0));
    assert_eq!(winner.value.log_id, 21);
}

#[test]
fn scrims_are_detected_per_side() {
    let roster = tracked(&[
        "[U:1:1]",
        "[U:1:2]",
        "[U:1:3]",
        "[U:1:4]",
        "[U:1:5]",
        "[U:1:6]",
    ]);

    // Four roster members on Red: an organized scrim.
    let stacked = build_games(&[(
        1,
        log(
            2,
            1,
            vec![
                ("[U:1:1]", player("Red", "soldier", 6000, 0, 10)),
                ("[U:1:2]", player("Red", "scout", 6000, 0, 10)),
                ("[U:1:3]", player("Red", "demoman", 6000, 0, 10)),
                ("[U:1:4]", player("Red", "medic", 600, 27000, 1)),
                ("[U:1:90]", player("Blue", "soldier", 6000, 0, 10)),
                ("[U:1:91]", player("Blue", "scout", 6000, 0, 10)),
            ],
        ),
    )]);
    assert!(stacked[0].is_scrim(&roster, 4));

    // Three per side does not meet the threshold on either side.
    let split = build_games(&[(
        2,
        log(
            2,
            1,
            vec![
                ("[U:1:1]", player("Red", "soldier", 6000, 0, 10)),
                ("[U:1:2]", player("Red", "scout", 6000, 0, 10)),
                ("[U:1:3]", player("Red", "demoman", 6000, 0, 10)),
                ("[U:1:4]", player("Blue", "soldier", 6000, 0, 10)),
                ("[U:1:5]", player("Blue", "scout", 6000, 0, 10)),
                ("[U:1:6]", player("Blue", "demoman", 6000, 0, 10)),
            ],
        ),
    )]);
    assert!(!split[0].is_scrim(&roster, 4));
}

#[test]
fn untracked_players_are_dropped_everywhere() {
    let games = build_games(&[(
        1,
        log(
            3,
            1,
            vec![
                ("[U:1:1]", player("Red", "soldier", 6000, 0, 10)),
                ("[U:1:99]", player("Blue", "scout", 12000, 0, 50)),
            ],
        ),
    )]);
    let aggregated = AggregatedStats::new(&games, &tracked(&["[U:1:1]"]));

    assert!(!aggregated.player_stats.contains_key("[U:1:99]"));
    for stat in &aggregated.max_stats {
        assert!(stat.winners.iter().all(|w| w.steam_id == "[U:1:1]"));
    }
}

#[test]
fn rollup_averages_span_games_and_roles() {
    let games = build_games(&[
        (
            1,
            log(
                3,
                1,
                vec![
                    ("[U:1:1]", player("Red", "soldier", 7500, 0, 10)),
                    ("[U:1:2]", player("Blue", "medic", 600, 27000, 1)),
                ],
            ),
        ),
        (
            2,
            log(
                1,
                3,
                vec![
                    ("[U:1:1]", player("Red", "soldier", 10500, 0, 10)),
                    ("[U:1:2]", player("Blue", "medic", 600, 30000, 1)),
                ],
            ),
        ),
    ]);
    let aggregated = AggregatedStats::new(&games, &tracked(&["[U:1:1]", "[U:1:2]"]));

    let soldier = &aggregated.player_stats["[U:1:1]"];
    assert_eq!(soldier.average_dpm, Some(300.0));
    assert_eq!(soldier.win_rate, Some(0.5));
    assert_eq!(soldier.per_class_dpm[&ClassType::Soldier], Some(300.0));
    assert_eq!(soldier.per_class_dpm[&ClassType::Scout], None);

    // The medic won game two and lost game one from Blue's perspective.
    let medic = &aggregated.player_stats["[U:1:2]"];
    assert_eq!(medic.average_hpm, Some(950.0));
    assert!(medic.average_dpm.is_none());
    assert_eq!(medic.win_rate, Some(0.5));
}

#[test]
fn unreliable_games_skip_the_rollup_but_not_leaderboards() {
    // Half-hour game the player left after ten minutes: playtime 600 of 1800.
    let late_joiner = json!({
        "team": "Red",
        "class_stats": [{"type": "scout", "total_time": 600}],
        "kills": 50,
        "assists": 0,
        "deaths": 0,
        "dmg": 9000,
        "heal": 0,
        "hr": 0,
        "as": 0,
        "cpc": 0,
    });
    let games = build_games(&[(
        1,
        log(
            3,
            1,
            vec![
                ("[U:1:1]", late_joiner),
                ("[U:1:2]", player("Blue", "soldier", 6000, 0, 10)),
            ],
        ),
    )]);
    let aggregated = AggregatedStats::new(&games, &tracked(&["[U:1:1]", "[U:1:2]"]));

    // Tracked players with no reliable games still get a (blank) aggregate.
    let unreliable = &aggregated.player_stats["[U:1:1]"];
    assert_eq!(unreliable.game_result_counts.total(), 0);
    assert!(unreliable.average_dpm.is_none());
    assert!(unreliable.win_rate.is_none());

    // Leaderboards scan the unfiltered records.
    let max_kills = aggregated
        .max_stats
        .iter()
        .find(|s| s.name == "Max Kills")
        .unwrap();
    assert_eq!(max_kills.winners.len(), 1);
    assert_eq!(max_kills.winners[0].steam_id, "[U:1:1]");
}
