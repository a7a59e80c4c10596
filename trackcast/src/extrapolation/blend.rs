//! Linear blending between pings.

use crate::model::Ping;

#[inline]
fn lerp(a: f64, b: f64, alpha: f64) -> f64 {
    (b - a) * alpha + a
}

/// Linearly interpolate every field of two pings.
///
/// `alpha` is not clamped: values outside `[0, 1]` extrapolate beyond the
/// segment. Heading is treated as a plain scalar, so blending 350° toward
/// 10° passes through 180° rather than wrapping through 0°.
pub fn interpolate(a: &Ping, b: &Ping, alpha: f64) -> Ping {
    Ping {
        position: (
            lerp(a.position.0, b.position.0, alpha),
            lerp(a.position.1, b.position.1, alpha),
        ),
        altitude: lerp(a.altitude, b.altitude, alpha),
        heading: lerp(a.heading, b.heading, alpha),
        time: lerp(a.time, b.time, alpha),
    }
}
