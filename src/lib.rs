//! Per-player performance summaries from logs.tf pug history: a declarative
//! stat registry builds per-game and per-player records, scrims and
//! unreliable samples are filtered out, and the remainder is rolled up into
//! per-player averages and best-single-game leaderboards for a spreadsheet.

pub mod aggregate;
pub mod config;
pub mod game_stats;
pub mod http_client;
pub mod log_cache;
pub mod logs_fetch;
pub mod model;
pub mod sheet_export;
pub mod stat_registry;
pub mod time_bounds;
