use serde::{Deserialize, Serialize};

pub const METERS_PER_KM: f64 = 1000.0;
pub const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    pub fn close_to(self, other: Self, epsilon_deg: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon_deg && (self.lon - other.lon).abs() <= epsilon_deg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Metric,
    Imperial,
}

/// A user-facing target distance, normalized to meters before routing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSpec {
    pub magnitude: f64,
    pub unit: Unit,
}

impl DistanceSpec {
    pub fn kilometers(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Metric,
        }
    }

    pub fn miles(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Imperial,
        }
    }

    pub fn meters(&self) -> f64 {
        match self.unit {
            Unit::Metric => self.magnitude * METERS_PER_KM,
            Unit::Imperial => self.magnitude * METERS_PER_MILE,
        }
    }
}

/// An intermediate point a route is directed through. Synthesized waypoints
/// are never stopovers: the walker passes through without halting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub coordinate: Coordinate,
    pub stopover: bool,
}

impl Waypoint {
    pub fn pass_through(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            stopover: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub waypoints: Vec<Waypoint>,
    pub mode: TravelMode,
    pub optimize_waypoints: bool,
}

impl RoutingRequest {
    /// A closed-loop walking request: origin and destination are both the
    /// start point, and the provider may reorder the waypoints.
    pub fn closed_loop(start: Coordinate, waypoints: Vec<Waypoint>) -> Self {
        Self {
            origin: start,
            destination: start,
            waypoints,
            mode: TravelMode::Walking,
            optimize_waypoints: true,
        }
    }
}

/// Status vocabulary of the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
}

/// Provider-produced route payload. The engine treats it as opaque apart
/// from handing it to a renderer; `waypoint_order` carries the provider's
/// optimized visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub path: Vec<Coordinate>,
    #[serde(default)]
    pub waypoint_order: Vec<usize>,
}

impl RouteResult {
    pub fn is_closed_loop(&self) -> bool {
        match (self.path.first(), self.path.last()) {
            (Some(&first), Some(&last)) => first.close_to(last, 1e-9),
            _ => false,
        }
    }
}
