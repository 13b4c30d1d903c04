//! External collaborators the session depends on, expressed as injected
//! capabilities. Production wires real providers; tests wire stubs.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Coordinate, RouteResult, RoutingRequest, RoutingStatus};

/// Opaque handle to a mounted display region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceHandle {
    pub id: String,
}

impl SurfaceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Presence of the rendering target. The session only cares about
/// "exists" vs "not yet existing": `find` answers immediately,
/// `wait_mounted` resumes once the surface appears (the session bounds
/// the wait with its own timeout).
#[async_trait]
pub trait SurfaceProvider: Send + Sync {
    fn find(&self, id: &str) -> Option<SurfaceHandle>;
    async fn wait_mounted(&self, id: &str) -> SurfaceHandle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("geolocation is not supported on this platform")]
    Unsupported,
    #[error("geolocation request timed out")]
    Timeout,
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_coordinate(&self) -> Result<Coordinate, GeolocationError>;
}

/// Live map handle produced by the constructor.
pub trait MapView: Send + Sync {
    fn set_center(&self, center: Coordinate);
    fn center(&self) -> Coordinate;
}

/// Route display handle paired with a map.
pub trait RouteRenderer: Send + Sync {
    fn render(&self, route: &RouteResult);
    fn clear(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("map construction failed: {reason}")]
pub struct MapInitError {
    pub reason: String,
}

pub type MapPair = (Arc<dyn MapView>, Arc<dyn RouteRenderer>);

#[async_trait]
pub trait MapConstructor: Send + Sync {
    async fn construct(
        &self,
        center: Coordinate,
        zoom: u8,
        surface: &SurfaceHandle,
    ) -> Result<MapPair, MapInitError>;
}

/// Routing provider contract: an awaitable call yielding the provider's
/// status and, when routing succeeded, the resulting path.
#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn route(&self, request: &RoutingRequest) -> (RoutingStatus, Option<RouteResult>);
}
