//! Timestamped kinematic samples.

use serde::{Deserialize, Serialize};

/// A single timestamped kinematic sample for one tracked entity.
///
/// Pings are plain values: once created they are never mutated, the engine
/// only ever synthesizes new ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    /// `(latitude, longitude)` in degrees.
    pub position: (f64, f64),
    /// Altitude in the unit supplied by the reporting source.
    pub altitude: f64,
    /// Heading in degrees.
    pub heading: f64,
    /// Milliseconds since the Unix epoch.
    pub time: f64,
}

impl Ping {
    /// Create a new ping.
    pub fn new(latitude: f64, longitude: f64, altitude: f64, heading: f64, time: f64) -> Self {
        Self {
            position: (latitude, longitude),
            altitude,
            heading,
            time,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.position.0
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.position.1
    }

    /// Componentwise difference `self - earlier`.
    ///
    /// This is a per-field subtraction, not a geodesic one. The heading
    /// difference is not wrapped into ±180°.
    pub fn delta_from(&self, earlier: &Ping) -> Ping {
        Ping {
            position: (
                self.position.0 - earlier.position.0,
                self.position.1 - earlier.position.1,
            ),
            altitude: self.altitude - earlier.altitude,
            heading: self.heading - earlier.heading,
            time: self.time - earlier.time,
        }
    }
}

impl std::fmt::Display for Ping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.5}, {:.5}) alt={:.1} hdg={:.1} t={}",
            self.position.0, self.position.1, self.altitude, self.heading, self.time
        )
    }
}
