//! Data model shared by ingestion, extrapolation and rendering.
//!
//! - [`Ping`]: one timestamped kinematic sample
//! - [`Track`]: newest-first ping history for one entity
//! - [`Entity`]: the renderable object whose position mirrors its track

mod entity;
mod ping;
mod track;

pub use entity::{Entity, EntityId};
pub use ping::Ping;
pub use track::{Track, DEFAULT_TRAIL_LENGTH};
