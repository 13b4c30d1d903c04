use crate::models::Coordinate;

/// Meters per degree of latitude, the flat-earth scale factor used when
/// placing waypoints near a reference point.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Offset `origin` by `distance_m` meters along `bearing_rad`.
///
/// Local flat-earth approximation: the latitude delta is the radial
/// distance projected on the north axis, the longitude delta is the east
/// projection corrected for meridian convergence at the origin's latitude.
/// Only valid for offsets small relative to Earth's radius (loop radii up
/// to a few tens of kilometers).
pub fn offset(origin: Coordinate, bearing_rad: f64, distance_m: f64) -> Coordinate {
    let lat = origin.lat + (distance_m / METERS_PER_DEGREE_LAT) * bearing_rad.cos();
    let lon = origin.lon
        + (distance_m / (METERS_PER_DEGREE_LAT * origin.lat.to_radians().cos()))
            * bearing_rad.sin();
    Coordinate { lat, lon }
}

/// Great-circle distance in meters between two coordinates.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Total length of a polyline in meters. Reporting helper only: the
/// synthesis engine never gates a route on its measured length.
pub fn path_length_m(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}
