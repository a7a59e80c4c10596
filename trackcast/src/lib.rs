//! Trackcast - smooth dead-reckoning for periodically reported tracks
//!
//! Remote sources report entity positions only every so often. This library
//! predicts where each entity is between reports, using a constant-turn-rate
//! model, and blends successive predictions so a rendered icon moves
//! continuously instead of jumping when new data arrives.

pub mod clock;
pub mod config;
pub mod error;
pub mod extrapolation;
pub mod logging;
pub mod model;
