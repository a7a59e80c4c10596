//! Per-entity ping history.
//!
//! A [`Track`] is stored newest-first: index 0 is the most recent sample.
//! The extrapolation engine only ever prepends to a track; trimming old
//! reports is the job of whoever ingests them (see [`Track::record`]).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Ping;

/// Default number of real reports kept per entity by [`Track::record`].
pub const DEFAULT_TRAIL_LENGTH: usize = 9;

/// Ordered ping history for one entity, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    pings: VecDeque<Ping>,
}

impl Track {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a track from pings already ordered newest-first.
    pub fn from_newest_first(pings: impl IntoIterator<Item = Ping>) -> Self {
        Self {
            pings: pings.into_iter().collect(),
        }
    }

    /// Record a freshly received report and keep at most `trail_length` pings.
    ///
    /// Intended for ingestion code that owns the canonical history. The
    /// oldest pings are dropped first.
    pub fn record(&mut self, ping: Ping, trail_length: usize) {
        self.pings.push_front(ping);
        self.pings.truncate(trail_length);
    }

    /// Prepend a ping without trimming.
    pub fn prepend(&mut self, ping: Ping) {
        self.pings.push_front(ping);
    }

    /// The newest ping, if any.
    pub fn first(&self) -> Option<&Ping> {
        self.pings.front()
    }

    /// The two newest pings as `(current, previous)`.
    pub fn latest_pair(&self) -> Option<(&Ping, &Ping)> {
        Some((self.pings.front()?, self.pings.get(1)?))
    }

    /// Ping at `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<&Ping> {
        self.pings.get(index)
    }

    pub fn len(&self) -> usize {
        self.pings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pings.is_empty()
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Ping> + ExactSizeIterator {
        self.pings.iter()
    }

    /// Drop all but the newest `trail_length` pings.
    pub fn truncate(&mut self, trail_length: usize) {
        self.pings.truncate(trail_length);
    }
}

impl FromIterator<Ping> for Track {
    fn from_iter<I: IntoIterator<Item = Ping>>(iter: I) -> Self {
        Self::from_newest_first(iter)
    }
}
