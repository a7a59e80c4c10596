//! Per-entity memory carried between ticks.

use std::collections::HashMap;

use crate::model::{EntityId, Ping};

/// What the stateful forecaster remembers about one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMemory {
    /// Last smoothed (rendered) position.
    pub position: Ping,
    /// Last raw forecast before smoothing.
    pub prediction: Ping,
}

/// Last rendered position and last raw forecast, keyed by entity id.
///
/// Owned by exactly one engine. Entries appear the first time an entity has
/// enough history to be forecast and are only removed by [`retain`] or
/// [`clear`].
///
/// [`retain`]: ExtrapolationState::retain
/// [`clear`]: ExtrapolationState::clear
#[derive(Debug, Clone, Default)]
pub struct ExtrapolationState {
    positions: HashMap<EntityId, Ping>,
    predictions: HashMap<EntityId, Ping>,
}

impl ExtrapolationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory for `id`, with each missing half defaulting to `current`.
    pub fn recall(&self, id: EntityId, current: &Ping) -> EntityMemory {
        EntityMemory {
            position: self.positions.get(&id).copied().unwrap_or(*current),
            prediction: self.predictions.get(&id).copied().unwrap_or(*current),
        }
    }

    /// Store this tick's rendered position and raw forecast.
    pub fn remember(&mut self, id: EntityId, position: Ping, prediction: Ping) {
        self.positions.insert(id, position);
        self.predictions.insert(id, prediction);
    }

    pub fn last_position(&self, id: EntityId) -> Option<&Ping> {
        self.positions.get(&id)
    }

    pub fn last_prediction(&self, id: EntityId) -> Option<&Ping> {
        self.predictions.get(&id)
    }

    /// Number of entities with memory.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drop memory for every id rejected by `keep`. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) -> usize {
        let before = self.positions.len();
        self.positions.retain(|id, _| keep(*id));
        let positions = &self.positions;
        self.predictions.retain(|id, _| positions.contains_key(id));
        before - self.positions.len()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.predictions.clear();
    }
}
