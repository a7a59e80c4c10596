//! Replay a recorded scenario through the engine.
//!
//! Scenario files are JSON:
//!
//! ```json
//! {
//!   "entities": [{ "id": 7, "latitude": 10.0, "longitude": 20.0, "altitude": 1000.0,
//!                  "created_at": "2024-05-01T12:00:00Z", "updated_at": "2024-05-01T12:00:00Z" }],
//!   "tracks": { "7": [{ "position": [10.0, 20.0], "altitude": 1000.0, "heading": 90.0, "time": 1000.0 },
//!                     { "position": [10.0, 19.0], "altitude": 1000.0, "heading": 90.0, "time": 0.0 }] }
//! }
//! ```
//!
//! Ticks run on a manual clock starting at the newest ping in the scenario.
//! Each track is first cut to the configured `track_trail_length`.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trackcast::clock::ManualClock;
use trackcast::config::ExtrapolationConfig;
use trackcast::extrapolation::{ExtrapolationEngine, ExtrapolationStrategy};
use trackcast::model::{Entity, EntityId, Track};

use super::config::load_config;
use crate::error::CliError;

/// Most ticks a single replay will run.
pub const MAX_TICKS: usize = 1_000_000;

/// Strategy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum StrategyArg {
    /// Blend across ticks using per-entity memory
    Stateful,
    /// Blend from the newest report only (needs three reports)
    Stateless,
}

impl From<StrategyArg> for ExtrapolationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Stateful => ExtrapolationStrategy::Stateful,
            StrategyArg::Stateless => ExtrapolationStrategy::Stateless,
        }
    }
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Scenario JSON file
    pub file: PathBuf,

    /// Expected seconds between server updates (overrides config)
    #[arg(long)]
    pub refresh_rate: Option<f64>,

    /// Forecasting strategy (overrides config)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Number of ticks to run (at most 1000000)
    #[arg(long, default_value_t = 10)]
    pub ticks: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 100.0)]
    pub interval_ms: f64,

    /// Config file (defaults to the user config location)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Recorded entities and their newest-first tracks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub tracks: HashMap<EntityId, Track>,
}

impl Scenario {
    /// Time of the newest ping across all tracks.
    pub fn latest_time(&self) -> Option<f64> {
        self.tracks
            .values()
            .filter_map(|t| t.first().map(|p| p.time))
            .reduce(f64::max)
    }

    /// Tracks cut down to their newest `trail_length` pings.
    pub fn trimmed_tracks(&self, trail_length: usize) -> HashMap<EntityId, Track> {
        self.tracks
            .iter()
            .map(|(&id, track)| {
                let mut track = track.clone();
                track.truncate(trail_length);
                (id, track)
            })
            .collect()
    }
}

/// One rendered entity position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayLine {
    pub tick: usize,
    pub id: EntityId,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(rate) = args.refresh_rate {
        let refresh_rate = Duration::try_from_secs_f64(rate)
            .map_err(|_| CliError::Argument(format!("refresh rate {} is not valid", rate)))?;
        config = config.with_refresh_rate(refresh_rate);
    }
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy.into());
    }

    let content = std::fs::read_to_string(&args.file)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    info!(
        file = %args.file.display(),
        entities = scenario.entities.len(),
        tracks = scenario.tracks.len(),
        strategy = %config.strategy,
        "Replaying scenario"
    );

    let lines = replay(&scenario, config, args.ticks, args.interval_ms)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in &lines {
        serde_json::to_writer(&mut out, line)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Tick the engine `ticks` times, `interval_ms` apart, collecting entity positions.
///
/// Each tick sees the scenario's recorded tracks, trimmed to the configured
/// trail length; forecasts are not fed
/// back, just as a host's canonical tracks only grow with real reports.
pub fn replay(
    scenario: &Scenario,
    config: ExtrapolationConfig,
    ticks: usize,
    interval_ms: f64,
) -> Result<Vec<ReplayLine>, CliError> {
    if !interval_ms.is_finite() || interval_ms < 0.0 {
        return Err(CliError::Argument(format!(
            "tick interval {} is not valid",
            interval_ms
        )));
    }
    if ticks > MAX_TICKS {
        return Err(CliError::Argument(format!(
            "tick count {} exceeds the limit of {}",
            ticks, MAX_TICKS
        )));
    }

    let tracks = scenario.trimmed_tracks(config.track_trail_length);
    debug!(trail_length = config.track_trail_length, "Trimmed scenario tracks");

    let clock = Arc::new(ManualClock::new(scenario.latest_time().unwrap_or(0.0)));
    let mut engine = ExtrapolationEngine::with_clock(config, Box::new(Arc::clone(&clock)))?;

    let entities: HashMap<EntityId, Entity> = scenario
        .entities
        .iter()
        .map(|e| (e.id, e.clone()))
        .collect();

    let mut lines = Vec::with_capacity(ticks.saturating_mul(entities.len()));
    for tick in 0..ticks {
        let out = engine.tick(&entities, &tracks);

        let mut ids: Vec<&EntityId> = out.entities.keys().collect();
        ids.sort();
        for id in ids {
            let entity = &out.entities[id];
            lines.push(ReplayLine {
                tick,
                id: *id,
                latitude: entity.latitude,
                longitude: entity.longitude,
                altitude: entity.altitude,
            });
        }
        clock.advance(interval_ms);
    }

    Ok(lines)
}
