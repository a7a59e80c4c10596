//! Constant-turn-rate dead reckoning.
//!
//! # Model
//!
//! The two newest real pings give a per-field delta. The position part of
//! that delta is rotated by the heading change, so an entity that turned
//! between the last two reports keeps turning at the same rate. The
//! forecast is placed `LOOKAHEAD_FACTOR` update intervals ahead of the
//! newest ping.
//!
//! # Damping
//!
//! Recomputing the forecast from scratch each tick makes the rendered icon
//! jump whenever a new report shifts the basis. Instead the result is
//! blended twice by `alpha`, the fraction of the lookahead window that has
//! elapsed since the last rendered position:
//!
//! ```text
//! last_prediction ──alpha──► prediction        = interp_prediction
//! current_position ──alpha──► interp_prediction = new_position
//! ```

use crate::error::ExtrapolationError;
use crate::model::Ping;

use super::blend::interpolate;

/// How many update intervals ahead the forecast is placed.
pub const LOOKAHEAD_FACTOR: f64 = 1.5;

/// Validated forecast horizon derived from the host's refresh rate.
///
/// Holding one of these guarantees `max_lookahead_ms() > 0`, so `alpha` is
/// always well defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookahead {
    refresh_rate_secs: f64,
    max_lookahead_ms: f64,
}

impl Lookahead {
    /// Build the horizon for a server refresh rate in seconds.
    ///
    /// Zero, negative, NaN and infinite rates are rejected.
    pub fn from_refresh_rate(refresh_rate_secs: f64) -> Result<Self, ExtrapolationError> {
        if !refresh_rate_secs.is_finite() || refresh_rate_secs <= 0.0 {
            return Err(ExtrapolationError::InvalidRefreshRate(refresh_rate_secs));
        }
        Ok(Self {
            refresh_rate_secs,
            max_lookahead_ms: refresh_rate_secs * 1000.0 * LOOKAHEAD_FACTOR,
        })
    }

    pub fn refresh_rate_secs(&self) -> f64 {
        self.refresh_rate_secs
    }

    /// Longest elapsed time (ms) a forecast may represent.
    pub fn max_lookahead_ms(&self) -> f64 {
        self.max_lookahead_ms
    }

    /// Time since `since`, clamped into `[0, max_lookahead_ms]`.
    pub fn elapsed(&self, since: f64, now: f64) -> f64 {
        (now - since).clamp(0.0, self.max_lookahead_ms)
    }

    /// Fraction of the lookahead window elapsed since `since`, in `[0, 1]`.
    pub fn alpha(&self, since: f64, now: f64) -> f64 {
        self.elapsed(since, now) / self.max_lookahead_ms
    }
}

/// Result of one prediction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    /// Smoothed position to render this tick.
    pub position: Ping,
    /// Raw forecast, fed back as next tick's `last_prediction`.
    pub prediction: Ping,
}

/// Rotate a 2D vector counter-clockwise by `degrees`.
pub fn rotate(vector: (f64, f64), degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (
        vector.0 * cos - vector.1 * sin,
        vector.0 * sin + vector.1 * cos,
    )
}

/// Raw constant-turn-rate forecast from the two newest real pings.
pub fn forecast(previous: &Ping, current: &Ping) -> Ping {
    let delta = current.delta_from(previous);
    let turned = rotate(delta.position, delta.heading);

    Ping {
        position: (
            current.position.0 + turned.0 * LOOKAHEAD_FACTOR,
            current.position.1 + turned.1 * LOOKAHEAD_FACTOR,
        ),
        altitude: current.altitude + delta.altitude * LOOKAHEAD_FACTOR,
        heading: current.heading + delta.heading * LOOKAHEAD_FACTOR,
        time: current.time + delta.time * LOOKAHEAD_FACTOR,
    }
}

/// Predict the entity's position at `now`.
///
/// `current_position` is the last rendered position and `last_prediction`
/// the last raw forecast; on first sight of an entity both are `current`.
pub fn predict(
    previous: &Ping,
    current: &Ping,
    current_position: &Ping,
    last_prediction: &Ping,
    lookahead: &Lookahead,
    now: f64,
) -> Forecast {
    let prediction = forecast(previous, current);
    let alpha = lookahead.alpha(current_position.time, now);

    let interp_prediction = interpolate(last_prediction, &prediction, alpha);
    let position = interpolate(current_position, &interp_prediction, alpha);

    Forecast {
        position,
        prediction,
    }
}
