use std::f64::consts::{FRAC_PI_4, PI};

use rand::Rng;

use crate::{
    geo,
    models::{Coordinate, Waypoint},
};

pub const DEFAULT_WAYPOINT_COUNT: usize = 2;

/// Synthesize a ring of candidate waypoints around `start` for a loop of
/// roughly `target_meters`.
///
/// Bearings are spread evenly around the circle, `2π(j+1)/(count+1)` for
/// waypoint `j`, plus a fresh uniform jitter in `[0, π/4)` per waypoint so
/// a degenerate out-and-back line is avoided and each retry explores a
/// structurally different candidate. Every waypoint sits at the same
/// radius `target_meters / (count+1)`, which keeps the provider's loop
/// length in the neighborhood of the target without a distance-matching
/// search.
pub fn synthesize(
    rng: &mut impl Rng,
    start: Coordinate,
    target_meters: f64,
    count: usize,
) -> Vec<Waypoint> {
    let radius = target_meters / (count as f64 + 1.0);

    (0..count)
        .map(|j| {
            let base = 2.0 * PI * (j as f64 + 1.0) / (count as f64 + 1.0);
            let bearing = base + rng.gen_range(0.0..FRAC_PI_4);
            Waypoint::pass_through(geo::offset(start, bearing, radius))
        })
        .collect()
}
