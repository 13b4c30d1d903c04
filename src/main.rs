use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use runloop::{
    geo, Coordinate, DistanceSpec, GeolocationError, GeolocationProvider, MapConstructor,
    MapInitError, MapPair, MapView, RouteEngine, RouteRenderer, RouteResult, RoutingRequest,
    RoutingService, RoutingStatus, RunloopError, Session, SurfaceHandle, SurfaceProvider, Unit,
    DEFAULT_SURFACE_ID,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Surface that is already mounted, like a pre-rendered page.
struct ImmediateSurfaces;

#[async_trait]
impl SurfaceProvider for ImmediateSurfaces {
    fn find(&self, id: &str) -> Option<SurfaceHandle> {
        Some(SurfaceHandle::new(id))
    }

    async fn wait_mounted(&self, id: &str) -> SurfaceHandle {
        SurfaceHandle::new(id)
    }
}

/// Geolocation backed by environment overrides; reports unsupported when
/// no coordinates were provided so the fallback path is exercised.
struct EnvGeolocation(Option<Coordinate>);

#[async_trait]
impl GeolocationProvider for EnvGeolocation {
    async fn current_coordinate(&self) -> Result<Coordinate, GeolocationError> {
        self.0.ok_or(GeolocationError::Unsupported)
    }
}

struct SimMap {
    center: Mutex<Coordinate>,
}

impl MapView for SimMap {
    fn set_center(&self, center: Coordinate) {
        *self.center.lock().expect("map center lock") = center;
        tracing::debug!("map recentered on ({:.4}, {:.4})", center.lat, center.lon);
    }

    fn center(&self) -> Coordinate {
        *self.center.lock().expect("map center lock")
    }
}

struct SimRenderer;

impl RouteRenderer for SimRenderer {
    fn render(&self, route: &RouteResult) {
        tracing::info!(
            "rendering loop of {} points, ~{:.2} km",
            route.path.len(),
            geo::path_length_m(&route.path) / 1000.0
        );
    }

    fn clear(&self) {
        tracing::info!("route display cleared");
    }
}

struct SimMapFactory;

#[async_trait]
impl MapConstructor for SimMapFactory {
    async fn construct(
        &self,
        center: Coordinate,
        zoom: u8,
        surface: &SurfaceHandle,
    ) -> Result<MapPair, MapInitError> {
        tracing::debug!("constructing map on surface \"{}\" at zoom {zoom}", surface.id);
        let map = Arc::new(SimMap {
            center: Mutex::new(center),
        });
        Ok((map, Arc::new(SimRenderer)))
    }
}

/// Routing provider stand-in: walks origin → waypoints → destination and
/// interpolates a handful of points along each leg.
struct SimRouter;

#[async_trait]
impl RoutingService for SimRouter {
    async fn route(&self, request: &RoutingRequest) -> (RoutingStatus, Option<RouteResult>) {
        const SAMPLES_PER_LEG: usize = 8;

        let mut stops = vec![request.origin];
        stops.extend(request.waypoints.iter().map(|w| w.coordinate));
        stops.push(request.destination);

        let mut path = Vec::new();
        for leg in stops.windows(2) {
            for i in 0..SAMPLES_PER_LEG {
                let t = i as f64 / SAMPLES_PER_LEG as f64;
                path.push(leg[0].interpolate(leg[1], t));
            }
        }
        path.push(request.destination);

        let route = RouteResult {
            path,
            waypoint_order: (0..request.waypoints.len()).collect(),
        };
        (RoutingStatus::Ok, Some(route))
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[tokio::main]
async fn main() -> Result<(), RunloopError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runloop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let start = match (env_f64("RUNLOOP_START_LAT"), env_f64("RUNLOOP_START_LON")) {
        (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
        _ => None,
    };
    let magnitude = env_f64("RUNLOOP_DISTANCE").unwrap_or(5.0);
    let unit = match std::env::var("RUNLOOP_UNIT").as_deref() {
        Ok("mi") | Ok("imperial") => Unit::Imperial,
        _ => Unit::Metric,
    };
    let distance = DistanceSpec { magnitude, unit };

    let engine = RouteEngine::new(Arc::new(SimRouter));
    let session = Session::new(
        Arc::new(ImmediateSurfaces),
        Arc::new(EnvGeolocation(start)),
        Arc::new(SimMapFactory),
        engine,
    );

    session.initialize(DEFAULT_SURFACE_ID).await?;
    let snapshot = session.snapshot().await;
    tracing::info!("session start coordinate: {:?}", snapshot.start);

    let outcome = session.generate(distance).await?;
    tracing::info!(
        "generated loop in {} attempt(s): {} points, ~{:.2} km",
        outcome.attempts,
        outcome.route.path.len(),
        geo::path_length_m(&outcome.route.path) / 1000.0
    );

    session.reset().await;
    session.teardown();
    Ok(())
}
