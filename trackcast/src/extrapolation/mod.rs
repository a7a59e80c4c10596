//! Dead-reckoning extrapolation of entity tracks.
//!
//! # Architecture
//!
//! ```text
//! tracks ──► Forecaster ──► predict ──► interpolate ──► forecast ping
//!               │  ▲                                        │
//!               ▼  │                                        ▼
//!        ExtrapolationState              prepend to track, move entity
//! ```
//!
//! - [`interpolate`]: linear blend of two pings
//! - [`predict`]: constant-turn-rate forecast, damped by elapsed time
//! - [`Forecaster`]: per-entity strategy (stateful or stateless)
//! - [`ExtrapolationEngine`]: runs the forecaster over every track once per tick
//!
//! # Example
//!
//! ```ignore
//! use trackcast::config::ExtrapolationConfig;
//! use trackcast::extrapolation::ExtrapolationEngine;
//!
//! let mut engine = ExtrapolationEngine::new(ExtrapolationConfig::default())?;
//!
//! // Once per refresh
//! let out = engine.tick(&entities, &tracks);
//! render(&out.entities);
//! ```

mod blend;
mod engine;
mod predict;
mod state;
mod strategy;

pub use blend::interpolate;
pub use engine::{Extrapolated, ExtrapolationEngine, SharedEngine, TickStats};
pub use predict::{forecast, predict, rotate, Forecast, Lookahead, LOOKAHEAD_FACTOR};
pub use state::{EntityMemory, ExtrapolationState};
pub use strategy::{ExtrapolationStrategy, Forecaster, StatefulForecaster, StatelessForecaster};
