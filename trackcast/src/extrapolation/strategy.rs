//! Forecasting strategies.
//!
//! Two strategies fill the same role and are kept separate on purpose:
//!
//! - [`StatefulForecaster`]: remembers the last rendered position and the
//!   last raw forecast per entity and blends across ticks. Smooth across
//!   report arrivals. This is the default.
//! - [`StatelessForecaster`]: blends from the newest real ping toward this
//!   tick's forecast using only the track it is given. Needs more history
//!   and can jump when a new report arrives, but keeps no memory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{EntityId, Ping, Track};

use super::blend::interpolate;
use super::predict::{forecast, predict, Lookahead};
use super::state::ExtrapolationState;

/// Produces the position to render for one entity this tick.
pub trait Forecaster: Send + fmt::Debug {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Minimum track length this strategy forecasts from.
    fn min_history(&self) -> usize;

    /// Forecast the current position of `id`, or `None` if `track` is too short.
    fn forecast(&mut self, id: EntityId, track: &Track, lookahead: &Lookahead, now: f64)
        -> Option<Ping>;

    /// Drop memory for ids rejected by `keep`. Returns how many were dropped.
    fn retain(&mut self, _keep: &mut dyn FnMut(EntityId) -> bool) -> usize {
        0
    }

    /// Number of entities the strategy holds memory for.
    fn tracked(&self) -> usize {
        0
    }

    /// Forget everything.
    fn reset(&mut self) {}
}

/// Double-blend forecaster with per-entity memory.
#[derive(Debug, Default)]
pub struct StatefulForecaster {
    state: ExtrapolationState,
}

impl StatefulForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously captured state.
    pub fn with_state(state: ExtrapolationState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ExtrapolationState {
        &self.state
    }
}

impl Forecaster for StatefulForecaster {
    fn name(&self) -> &'static str {
        "stateful"
    }

    fn min_history(&self) -> usize {
        2
    }

    fn forecast(
        &mut self,
        id: EntityId,
        track: &Track,
        lookahead: &Lookahead,
        now: f64,
    ) -> Option<Ping> {
        let (current, previous) = track.latest_pair()?;
        let memory = self.state.recall(id, current);

        let result = predict(
            previous,
            current,
            &memory.position,
            &memory.prediction,
            lookahead,
            now,
        );
        trace!(id, position = %result.position, prediction = %result.prediction, "Forecast");

        self.state.remember(id, result.position, result.prediction);
        Some(result.position)
    }

    fn retain(&mut self, keep: &mut dyn FnMut(EntityId) -> bool) -> usize {
        self.state.retain(keep)
    }

    fn tracked(&self) -> usize {
        self.state.len()
    }

    fn reset(&mut self) {
        self.state.clear();
    }
}

/// Single-blend forecaster without memory.
///
/// Only forecasts tracks holding more than two pings.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatelessForecaster;

impl Forecaster for StatelessForecaster {
    fn name(&self) -> &'static str {
        "stateless"
    }

    fn min_history(&self) -> usize {
        3
    }

    fn forecast(
        &mut self,
        id: EntityId,
        track: &Track,
        lookahead: &Lookahead,
        now: f64,
    ) -> Option<Ping> {
        if track.len() < self.min_history() {
            return None;
        }
        let (current, previous) = track.latest_pair()?;

        let prediction = forecast(previous, current);
        let alpha = lookahead.alpha(current.time, now);
        let position = interpolate(current, &prediction, alpha);
        trace!(id, %position, alpha, "Forecast");

        Some(position)
    }
}

/// Which [`Forecaster`] an engine uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationStrategy {
    #[default]
    Stateful,
    Stateless,
}

impl ExtrapolationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtrapolationStrategy::Stateful => "stateful",
            ExtrapolationStrategy::Stateless => "stateless",
        }
    }

    /// Instantiate a fresh forecaster for this strategy.
    pub fn forecaster(&self) -> Box<dyn Forecaster> {
        match self {
            ExtrapolationStrategy::Stateful => Box::new(StatefulForecaster::new()),
            ExtrapolationStrategy::Stateless => Box::new(StatelessForecaster),
        }
    }
}

impl fmt::Display for ExtrapolationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtrapolationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stateful" => Ok(ExtrapolationStrategy::Stateful),
            "stateless" => Ok(ExtrapolationStrategy::Stateless),
            other => Err(format!("unknown extrapolation strategy '{}'", other)),
        }
    }
}
