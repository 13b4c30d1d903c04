use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    capability::{
        GeolocationError, GeolocationProvider, MapConstructor, MapInitError, MapView,
        RouteRenderer, SurfaceHandle, SurfaceProvider,
    },
    engine::{RouteEngine, RouteGenerationError, SynthesisOutcome},
    models::{Coordinate, DistanceSpec},
};

/// How long to wait for the display surface before declaring the session
/// unstartable.
pub const SURFACE_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Start coordinate used when geolocation fails (New York City).
pub const FALLBACK_START: Coordinate = Coordinate {
    lat: 40.7128,
    lon: -74.0060,
};

pub const INITIAL_ZOOM: u8 = 14;

pub const DEFAULT_SURFACE_ID: &str = "map";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("timed out waiting for display surface \"{0}\"")]
    SurfaceTimeout(String),
    #[error("failed to initialize map: {0}")]
    MapInit(#[from] MapInitError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("session is not ready: {0}")]
    Precondition(&'static str),
    #[error(transparent)]
    Synthesis(#[from] RouteGenerationError),
}

#[derive(Default)]
struct SessionState {
    map: Option<Arc<dyn MapView>>,
    renderer: Option<Arc<dyn RouteRenderer>>,
    start: Option<Coordinate>,
    loading: bool,
    error: Option<String>,
}

/// Observable snapshot of the session, safe to hand to a UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub start: Option<Coordinate>,
    pub loading: bool,
    pub error: Option<String>,
    pub map_ready: bool,
    pub renderer_ready: bool,
}

/// One interactive map session: startup sequencing plus the user-triggered
/// actions operating on the resulting state.
///
/// Startup runs three phases strictly in order — surface wait (bounded by
/// [`SURFACE_WAIT_TIMEOUT`]), start-coordinate resolution (geolocation with
/// [`FALLBACK_START`] on any failure), map construction. A cancellation
/// token tracks whether the owning view is still mounted; every state
/// mutation checks it first, so results of operations that complete after
/// teardown are discarded rather than committed.
pub struct Session {
    surfaces: Arc<dyn SurfaceProvider>,
    geolocation: Arc<dyn GeolocationProvider>,
    maps: Arc<dyn MapConstructor>,
    engine: RouteEngine,
    state: Mutex<SessionState>,
    liveness: CancellationToken,
}

impl Session {
    pub fn new(
        surfaces: Arc<dyn SurfaceProvider>,
        geolocation: Arc<dyn GeolocationProvider>,
        maps: Arc<dyn MapConstructor>,
        engine: RouteEngine,
    ) -> Self {
        Self {
            surfaces,
            geolocation,
            maps,
            engine,
            state: Mutex::new(SessionState {
                loading: true,
                ..SessionState::default()
            }),
            liveness: CancellationToken::new(),
        }
    }

    /// Mark the owning view as torn down. In-flight operations are not
    /// aborted; their results are discarded when they try to commit.
    pub fn teardown(&self) {
        self.liveness.cancel();
    }

    pub fn is_live(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            start: state.start,
            loading: state.loading,
            error: state.error.clone(),
            map_ready: state.map.is_some(),
            renderer_ready: state.renderer.is_some(),
        }
    }

    /// Run the startup sequence. Fatal failures (surface timeout, map
    /// construction) are recorded in the session error state and returned;
    /// geolocation failures are absorbed by the fallback coordinate.
    /// `loading` clears exactly once whatever the outcome, unless the view
    /// was torn down first.
    pub async fn initialize(&self, surface_id: &str) -> Result<(), SessionError> {
        let result = self.run_startup(surface_id).await;

        if let Err(err) = &result {
            tracing::error!("session initialization failed: {err}");
            if self.is_live() {
                self.state.lock().await.error = Some(err.to_string());
            }
        }
        if self.is_live() {
            self.state.lock().await.loading = false;
        }

        result
    }

    async fn run_startup(&self, surface_id: &str) -> Result<(), SessionError> {
        let surface = self.wait_for_surface(surface_id).await?;
        tracing::debug!("display surface \"{}\" ready", surface.id);

        let start = self.resolve_start_coordinate().await;
        if self.is_live() {
            self.state.lock().await.start = Some(start);
        }

        let (map, renderer) = self.maps.construct(start, INITIAL_ZOOM, &surface).await?;
        if self.is_live() {
            let mut state = self.state.lock().await;
            state.map = Some(map);
            state.renderer = Some(renderer);
            state.error = None;
            tracing::info!(
                "session ready: map centered on ({:.4}, {:.4}) at zoom {INITIAL_ZOOM}",
                start.lat,
                start.lon
            );
        } else {
            tracing::debug!("view torn down before map construction finished; discarding handles");
        }

        Ok(())
    }

    async fn wait_for_surface(&self, id: &str) -> Result<SurfaceHandle, SessionError> {
        if let Some(surface) = self.surfaces.find(id) {
            return Ok(surface);
        }

        tracing::debug!("display surface \"{id}\" not yet mounted; waiting");
        tokio::time::timeout(SURFACE_WAIT_TIMEOUT, self.surfaces.wait_mounted(id))
            .await
            .map_err(|_| SessionError::SurfaceTimeout(id.to_string()))
    }

    /// Best-effort geolocation: never fatal, any failure falls back to the
    /// fixed default start.
    async fn resolve_start_coordinate(&self) -> Coordinate {
        match self.geolocation.current_coordinate().await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                tracing::warn!("geolocation unavailable ({err}); using fallback start");
                FALLBACK_START
            }
        }
    }

    /// "Use current location" action: re-query geolocation and recenter.
    /// Unlike startup, a failure here is returned to the caller to surface.
    pub async fn use_current_location(&self) -> Result<Coordinate, GeolocationError> {
        let coordinate = self.geolocation.current_coordinate().await?;
        self.set_start(coordinate).await;
        Ok(coordinate)
    }

    /// Address-selection action: adopt a coordinate chosen outside the
    /// session (autocomplete widget) as the new start.
    pub async fn select_address(&self, coordinate: Coordinate) {
        self.set_start(coordinate).await;
    }

    async fn set_start(&self, coordinate: Coordinate) {
        if !self.is_live() {
            return;
        }
        let mut state = self.state.lock().await;
        state.start = Some(coordinate);
        if let Some(map) = &state.map {
            map.set_center(coordinate);
        }
    }

    /// "Generate" action: run the synthesis engine from the current start
    /// and hand the loop to the renderer. Rejected up front when the map,
    /// renderer or start coordinate is not available yet.
    pub async fn generate(&self, distance: DistanceSpec) -> Result<SynthesisOutcome, GenerateError> {
        let (start, renderer) = {
            let state = self.state.lock().await;
            if state.map.is_none() {
                return Err(GenerateError::Precondition("map is not ready yet"));
            }
            let renderer = state
                .renderer
                .clone()
                .ok_or(GenerateError::Precondition("route renderer is not ready yet"))?;
            let start = state
                .start
                .ok_or(GenerateError::Precondition("no start location selected"))?;
            (start, renderer)
        };

        let outcome = self.engine.generate_loop(start, distance).await?;
        renderer.render(&outcome.route);
        Ok(outcome)
    }

    /// "Reset" action: clear any rendered route, keep everything else.
    pub async fn reset(&self) {
        let state = self.state.lock().await;
        if let Some(renderer) = &state.renderer {
            renderer.clear();
        }
    }
}
