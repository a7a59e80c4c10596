//! Per-tick orchestration.
//!
//! One [`ExtrapolationEngine`] belongs to one map view. The host's refresh
//! loop calls [`tick`](ExtrapolationEngine::tick) with the current entity
//! and track collections; the engine returns updated copies in which every
//! entity with enough history has been moved to its forecast position.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::ExtrapolationConfig;
use crate::error::Result;
use crate::model::{Entity, EntityId, Track};

use super::predict::Lookahead;
use super::strategy::Forecaster;

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Tracks that received a forecast ping.
    pub extrapolated: usize,
    /// Tracks returned unchanged.
    pub passed_through: usize,
    /// Entities whose position was rewritten from their track.
    pub entities_updated: usize,
    /// Entities whose forecaster memory was evicted.
    pub evicted: usize,
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extrapolated={} passed_through={} entities_updated={} evicted={}",
            self.extrapolated, self.passed_through, self.entities_updated, self.evicted
        )
    }
}

/// Output of one tick.
#[derive(Debug, Clone, Default)]
pub struct Extrapolated {
    pub entities: HashMap<EntityId, Entity>,
    pub tracks: HashMap<EntityId, Track>,
    pub stats: TickStats,
}

/// Dead-reckoning engine for one map view.
#[derive(Debug)]
pub struct ExtrapolationEngine {
    config: ExtrapolationConfig,
    lookahead: Lookahead,
    forecaster: Box<dyn Forecaster>,
    clock: Box<dyn Clock>,
}

impl ExtrapolationEngine {
    /// Create an engine reading the system clock.
    ///
    /// Fails if the configured refresh rate is not positive.
    pub fn new(config: ExtrapolationConfig) -> Result<Self> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create an engine reading `clock`.
    pub fn with_clock(config: ExtrapolationConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let lookahead = config.lookahead()?;
        let forecaster = config.strategy.forecaster();
        debug!(
            strategy = forecaster.name(),
            refresh_rate_secs = lookahead.refresh_rate_secs(),
            max_lookahead_ms = lookahead.max_lookahead_ms(),
            "Extrapolation engine created"
        );
        Ok(Self {
            config,
            lookahead,
            forecaster,
            clock,
        })
    }

    /// Replace the forecaster, e.g. to inject pre-seeded state.
    pub fn with_forecaster(mut self, forecaster: Box<dyn Forecaster>) -> Self {
        self.forecaster = forecaster;
        self
    }

    pub fn config(&self) -> &ExtrapolationConfig {
        &self.config
    }

    pub fn lookahead(&self) -> &Lookahead {
        &self.lookahead
    }

    /// Number of entities the forecaster currently remembers.
    pub fn tracked_entities(&self) -> usize {
        self.forecaster.tracked()
    }

    /// Forget all per-entity memory.
    pub fn reset(&mut self) {
        self.forecaster.reset();
    }

    /// Run one tick at the clock's current time.
    pub fn tick(
        &mut self,
        entities: &HashMap<EntityId, Entity>,
        tracks: &HashMap<EntityId, Track>,
    ) -> Extrapolated {
        let now = self.clock.now_millis();
        self.tick_at(now, entities, tracks)
    }

    /// Run one tick at `now` (ms since epoch), honouring `enabled`.
    pub fn tick_at(
        &mut self,
        now: f64,
        entities: &HashMap<EntityId, Entity>,
        tracks: &HashMap<EntityId, Track>,
    ) -> Extrapolated {
        if !self.config.enabled {
            return Extrapolated {
                entities: entities.clone(),
                tracks: tracks.clone(),
                stats: TickStats {
                    passed_through: tracks.len(),
                    ..TickStats::default()
                },
            };
        }
        self.extrapolate(now, entities, tracks)
    }

    /// Forecast every track and move entities onto their newest ping.
    ///
    /// Entity and track counts are preserved. Tracks too short for the
    /// forecaster are returned unchanged; entities without a non-empty
    /// track are returned unchanged.
    pub fn extrapolate(
        &mut self,
        now: f64,
        entities: &HashMap<EntityId, Entity>,
        tracks: &HashMap<EntityId, Track>,
    ) -> Extrapolated {
        let mut stats = TickStats::default();

        let new_tracks: HashMap<EntityId, Track> = tracks
            .iter()
            .map(|(&id, track)| {
                let mut track = track.clone();
                match self.forecaster.forecast(id, &track, &self.lookahead, now) {
                    Some(position) => {
                        track.prepend(position);
                        stats.extrapolated += 1;
                    }
                    None => stats.passed_through += 1,
                }
                (id, track)
            })
            .collect();

        let new_entities: HashMap<EntityId, Entity> = entities
            .iter()
            .map(|(&id, entity)| {
                let moved = new_tracks
                    .get(&id)
                    .and_then(Track::first)
                    .map(|newest| entity.with_position(newest));
                match moved {
                    Some(entity) => {
                        stats.entities_updated += 1;
                        (id, entity)
                    }
                    None => (id, entity.clone()),
                }
            })
            .collect();

        if self.config.evict_stale {
            stats.evicted = self
                .forecaster
                .retain(&mut |id: EntityId| entities.contains_key(&id) || tracks.contains_key(&id));
        }

        debug!(now, %stats, strategy = self.forecaster.name(), "Extrapolation tick");

        Extrapolated {
            entities: new_entities,
            tracks: new_tracks,
            stats,
        }
    }
}

/// Engine handle that serializes ticks issued from several threads.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<ExtrapolationEngine>>,
}

impl SharedEngine {
    pub fn new(engine: ExtrapolationEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run one tick with exclusive access to the engine.
    pub fn tick(
        &self,
        entities: &HashMap<EntityId, Entity>,
        tracks: &HashMap<EntityId, Track>,
    ) -> Extrapolated {
        self.inner.lock().tick(entities, tracks)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut ExtrapolationEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::extrapolation::{ExtrapolationState, ExtrapolationStrategy, StatefulForecaster};
    use crate::model::Ping;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn entity(id: EntityId) -> Entity {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut entity = Entity::new(id, 0.0, 0.0, 0.0, created).with_property("Name", "E-3A");
        entity.updated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 0).unwrap();
        entity
    }

    fn scenario_track() -> Track {
        Track::from_newest_first([
            Ping::new(10.0, 20.0, 1000.0, 90.0, 1_000.0),
            Ping::new(10.0, 19.0, 1000.0, 90.0, 0.0),
        ])
    }

    fn engine() -> ExtrapolationEngine {
        ExtrapolationEngine::new(ExtrapolationConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_zero_refresh_rate() {
        let config = ExtrapolationConfig::default().with_refresh_rate(Duration::ZERO);
        assert!(ExtrapolationEngine::new(config).is_err());
    }

    #[test]
    fn test_scenario_alpha_zero() {
        let mut engine = engine();
        let entities = HashMap::from([(7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);
        let current = *scenario_track().first().unwrap();

        let out = engine.extrapolate(1_000.0, &entities, &tracks);

        let track = &out.tracks[&7];
        assert_eq!(track.len(), 3);
        assert_eq!(track.first(), Some(&current));

        let moved = &out.entities[&7];
        assert_eq!(moved.latitude, 10.0);
        assert_eq!(moved.longitude, 20.0);
        assert_eq!(moved.altitude, 1000.0);
        assert_eq!(moved.created_at, entities[&7].created_at);
        assert_eq!(moved.updated_at, entities[&7].updated_at);
        assert_eq!(out.stats.extrapolated, 1);
        assert_eq!(out.stats.entities_updated, 1);
    }

    #[test]
    fn test_short_tracks_pass_through() {
        let mut engine = engine();
        let single = Track::from_newest_first([Ping::new(5.0, 6.0, 700.0, 0.0, 0.0)]);
        let entities = HashMap::from([(1, entity(1)), (2, entity(2))]);
        let tracks = HashMap::from([(1, single.clone()), (2, Track::new())]);

        let out = engine.extrapolate(500.0, &entities, &tracks);

        assert_eq!(out.tracks[&1], single);
        assert!(out.tracks[&2].is_empty());
        // Entity 1 mirrors its only real ping, entity 2 is untouched
        assert_eq!(out.entities[&1].latitude, 5.0);
        assert_eq!(out.entities[&1].longitude, 6.0);
        assert_eq!(out.entities[&1].altitude, 700.0);
        assert_eq!(out.entities[&2], entities[&2]);
        assert_eq!(out.stats.passed_through, 2);
        assert_eq!(engine.tracked_entities(), 0);
    }

    #[test]
    fn test_entity_without_track_is_identical() {
        let mut engine = engine();
        let entities = HashMap::from([(1, entity(1)), (7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);

        let out = engine.extrapolate(1_200.0, &entities, &tracks);
        assert_eq!(out.entities[&1], entities[&1]);
    }

    #[test]
    fn test_cardinality_preserved() {
        let mut engine = engine();
        let entities = HashMap::from([(1, entity(1)), (2, entity(2)), (3, entity(3))]);
        // Track 9 has no entity, entity 3 has no track
        let tracks = HashMap::from([(1, scenario_track()), (2, Track::new()), (9, scenario_track())]);

        let out = engine.extrapolate(1_500.0, &entities, &tracks);
        assert_eq!(out.entities.len(), 3);
        assert_eq!(out.tracks.len(), 3);
        assert!(out.tracks.contains_key(&9));
    }

    #[test]
    fn test_entity_mirrors_first_track_ping() {
        let mut engine = engine();
        let entities = HashMap::from([(7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);

        let out = engine.extrapolate(1_750.0, &entities, &tracks);
        let first = out.tracks[&7].first().unwrap();
        let moved = &out.entities[&7];
        assert_eq!(moved.latitude, first.latitude());
        assert_eq!(moved.longitude, first.longitude());
        assert_eq!(moved.altitude, first.altitude);
        assert!(moved.longitude > 20.0);
    }

    #[test]
    fn test_state_advances_between_ticks() {
        let mut engine = engine();
        let entities = HashMap::from([(7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);

        let first = engine.extrapolate(1_500.0, &entities, &tracks);
        let second = engine.extrapolate(2_000.0, &entities, &tracks);

        let lon1 = first.entities[&7].longitude;
        let lon2 = second.entities[&7].longitude;
        assert!(lon2 > lon1, "{} should be east of {}", lon2, lon1);
        assert_eq!(engine.tracked_entities(), 1);
    }

    #[test]
    fn test_injected_state() {
        let mut state = ExtrapolationState::new();
        let remembered = Ping::new(10.0, 20.5, 1000.0, 90.0, 1_000.0);
        state.remember(7, remembered, remembered);
        let mut engine =
            engine().with_forecaster(Box::new(StatefulForecaster::with_state(state)));

        let entities = HashMap::from([(7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);

        // alpha 0 returns the remembered position rather than the ping
        let out = engine.extrapolate(1_000.0, &entities, &tracks);
        assert_eq!(out.tracks[&7].first(), Some(&remembered));
    }

    #[test]
    fn test_evicts_vanished_entities() {
        let mut engine = engine();
        let entities = HashMap::from([(1, entity(1)), (2, entity(2))]);
        let tracks = HashMap::from([(1, scenario_track()), (2, scenario_track())]);
        engine.extrapolate(1_000.0, &entities, &tracks);
        assert_eq!(engine.tracked_entities(), 2);

        let entities = HashMap::from([(1, entity(1))]);
        let tracks = HashMap::from([(1, scenario_track())]);
        let out = engine.extrapolate(1_100.0, &entities, &tracks);
        assert_eq!(out.stats.evicted, 1);
        assert_eq!(engine.tracked_entities(), 1);
    }

    #[test]
    fn test_eviction_can_be_disabled() {
        let config = ExtrapolationConfig::default().with_evict_stale(false);
        let mut engine = ExtrapolationEngine::new(config).unwrap();
        let tracks = HashMap::from([(1, scenario_track())]);
        engine.extrapolate(1_000.0, &HashMap::new(), &tracks);

        let out = engine.extrapolate(1_100.0, &HashMap::new(), &HashMap::new());
        assert_eq!(out.stats.evicted, 0);
        assert_eq!(engine.tracked_entities(), 1);
    }

    #[test]
    fn test_disabled_passes_through() {
        let config = ExtrapolationConfig::default().with_enabled(false);
        let mut engine = ExtrapolationEngine::new(config).unwrap();
        let entities = HashMap::from([(7, entity(7))]);
        let tracks = HashMap::from([(7, scenario_track())]);

        let out = engine.tick_at(1_750.0, &entities, &tracks);
        assert_eq!(out.tracks, tracks);
        assert_eq!(out.entities, entities);
        assert_eq!(engine.tracked_entities(), 0);
    }

    #[test]
    fn test_stateless_engine_needs_three_pings() {
        let config = ExtrapolationConfig::default().with_strategy(ExtrapolationStrategy::Stateless);
        let mut engine = ExtrapolationEngine::new(config).unwrap();
        let tracks = HashMap::from([(7, scenario_track())]);

        let out = engine.extrapolate(1_750.0, &HashMap::new(), &tracks);
        assert_eq!(out.tracks[&7], scenario_track());
        assert_eq!(out.stats.extrapolated, 0);
    }

    #[test]
    fn test_tick_reads_clock_once() {
        let clock = Arc::new(ManualClock::new(1_750.0));
        let mut engine =
            ExtrapolationEngine::with_clock(ExtrapolationConfig::default(), Box::new(Arc::clone(&clock)))
                .unwrap();
        let tracks = HashMap::from([(1, scenario_track()), (2, scenario_track())]);

        let out = engine.tick(&HashMap::new(), &tracks);
        // Same history and same instant give the same forecast
        assert_eq!(out.tracks[&1].first(), out.tracks[&2].first());
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let tracks = HashMap::from([(1, scenario_track())]);
        engine.extrapolate(1_000.0, &HashMap::new(), &tracks);
        engine.reset();
        assert_eq!(engine.tracked_entities(), 0);
    }

    #[test]
    fn test_shared_engine_ticks() {
        let clock = Arc::new(ManualClock::new(1_000.0));
        let engine =
            ExtrapolationEngine::with_clock(ExtrapolationConfig::default(), Box::new(Arc::clone(&clock)))
                .unwrap();
        let shared = SharedEngine::new(engine);
        let tracks = HashMap::from([(7, scenario_track())]);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let tracks = tracks.clone();
                std::thread::spawn(move || shared.tick(&HashMap::new(), &tracks).stats.extrapolated)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(shared.with_engine(|e| e.tracked_entities()), 1);
    }
}
