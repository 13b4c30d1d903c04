//! Closed-loop walking route synthesis: pick a start point and a target
//! distance, get a loop routed through randomized waypoints by an injected
//! routing provider, with session startup handling surface readiness,
//! geolocation fallback and map construction.

pub mod capability;
pub mod engine;
pub mod error;
pub mod geo;
pub mod models;
pub mod session;
pub mod waypoints;

pub use capability::{
    GeolocationError, GeolocationProvider, MapConstructor, MapInitError, MapPair, MapView,
    RouteRenderer, RoutingService, SurfaceHandle, SurfaceProvider,
};
pub use engine::{
    RouteEngine, RouteGenerationError, RoutingFailure, SynthesisOutcome, MAX_ATTEMPTS,
};
pub use error::RunloopError;
pub use models::{
    Coordinate, DistanceSpec, RouteResult, RoutingRequest, RoutingStatus, TravelMode, Unit,
    Waypoint,
};
pub use session::{
    GenerateError, Session, SessionError, SessionSnapshot, DEFAULT_SURFACE_ID, FALLBACK_START,
    INITIAL_ZOOM, SURFACE_WAIT_TIMEOUT,
};
