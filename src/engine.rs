use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    capability::RoutingService,
    models::{Coordinate, DistanceSpec, RouteResult, RoutingRequest, RoutingStatus, Waypoint},
    waypoints::{self, DEFAULT_WAYPOINT_COUNT},
};

pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("routing request failed with status {status:?}")]
pub struct RoutingFailure {
    pub status: RoutingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteGenerationError {
    #[error("target distance must be finite and strictly positive")]
    InvalidDistance,
    #[error("no usable loop after {MAX_ATTEMPTS} attempts: {last}")]
    Exhausted { last: RoutingFailure },
}

/// A successfully generated loop plus the attempt index that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutcome {
    pub route: RouteResult,
    pub attempts: u32,
}

/// Issue one loop routing request through `waypoints` and validate the
/// provider's answer. Succeeds only on an `Ok` status with a present
/// result; any other reply becomes a `RoutingFailure` carrying the status.
pub async fn request_loop(
    routing: &dyn RoutingService,
    start: Coordinate,
    waypoints: Vec<Waypoint>,
) -> Result<RouteResult, RoutingFailure> {
    let request = RoutingRequest::closed_loop(start, waypoints);
    match routing.route(&request).await {
        (RoutingStatus::Ok, Some(route)) => Ok(route),
        (status, _) => Err(RoutingFailure { status }),
    }
}

/// Turns (start, target distance) into a routed closed loop.
///
/// # Algorithm
///
/// Each attempt synthesizes a fresh randomized waypoint ring and issues
/// exactly one routing call; a failed attempt is retried with new
/// waypoints (a structurally different candidate, not a plain repeat) up
/// to `MAX_ATTEMPTS` times. Attempts run strictly in sequence and carry
/// no state between them besides the counter. The returned route's length
/// is never measured against the target: only the provider status is
/// checked, so a waypoint-optimized loop that deviates from the target
/// distance is accepted as-is.
pub struct RouteEngine {
    routing: Arc<dyn RoutingService>,
    rng: Mutex<StdRng>,
    waypoint_count: usize,
}

impl RouteEngine {
    pub fn new(routing: Arc<dyn RoutingService>) -> Self {
        Self::with_rng(routing, StdRng::from_entropy())
    }

    /// Deterministic engine for tests and reproducible runs.
    pub fn seeded(routing: Arc<dyn RoutingService>, seed: u64) -> Self {
        Self::with_rng(routing, StdRng::seed_from_u64(seed))
    }

    fn with_rng(routing: Arc<dyn RoutingService>, rng: StdRng) -> Self {
        Self {
            routing,
            rng: Mutex::new(rng),
            waypoint_count: DEFAULT_WAYPOINT_COUNT,
        }
    }

    pub async fn generate_loop(
        &self,
        start: Coordinate,
        distance: DistanceSpec,
    ) -> Result<SynthesisOutcome, RouteGenerationError> {
        let target_meters = distance.meters();
        if !target_meters.is_finite() || target_meters <= 0.0 {
            return Err(RouteGenerationError::InvalidDistance);
        }

        tracing::info!(
            "generating loop: target {:.0}m around ({:.4}, {:.4})",
            target_meters,
            start.lat,
            start.lon
        );

        let mut attempt = 1;
        loop {
            let ring = {
                let mut rng = self.rng.lock().await;
                waypoints::synthesize(&mut *rng, start, target_meters, self.waypoint_count)
            };

            match request_loop(self.routing.as_ref(), start, ring).await {
                Ok(route) => {
                    tracing::info!(
                        "loop accepted on attempt {attempt}/{MAX_ATTEMPTS} ({} points)",
                        route.path.len()
                    );
                    return Ok(SynthesisOutcome {
                        route,
                        attempts: attempt,
                    });
                }
                Err(failure) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        "attempt {attempt}/{MAX_ATTEMPTS} rejected with status {:?}; retrying with fresh waypoints",
                        failure.status
                    );
                    attempt += 1;
                }
                Err(failure) => {
                    tracing::warn!(
                        "attempt {attempt}/{MAX_ATTEMPTS} rejected with status {:?}; giving up",
                        failure.status
                    );
                    return Err(RouteGenerationError::Exhausted { last: failure });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RoutingService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    const START: Coordinate = Coordinate { lat: 40.0, lon: -73.0 };

    /// Fails the first `fail_first` calls with ZERO_RESULTS, then answers
    /// with a loop through the requested waypoints.
    struct ScriptedRouter {
        fail_first: u32,
        calls: AtomicU32,
        requests: StdMutex<Vec<RoutingRequest>>,
    }

    impl ScriptedRouter {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                calls: AtomicU32::new(0),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RoutingService for ScriptedRouter {
        async fn route(&self, request: &RoutingRequest) -> (RoutingStatus, Option<RouteResult>) {
            self.requests.lock().unwrap().push(request.clone());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return (RoutingStatus::ZeroResults, None);
            }

            let mut path = vec![request.origin];
            path.extend(request.waypoints.iter().map(|w| w.coordinate));
            path.push(request.destination);
            (
                RoutingStatus::Ok,
                Some(RouteResult {
                    path,
                    waypoint_order: (0..request.waypoints.len()).collect(),
                }),
            )
        }
    }

    #[tokio::test]
    async fn first_attempt_success_stops_immediately() {
        let router = Arc::new(ScriptedRouter::new(0));
        let engine = RouteEngine::seeded(router.clone(), 11);

        let outcome = engine
            .generate_loop(START, DistanceSpec::miles(3.0))
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 1);
        assert_eq!(router.calls(), 1);
        assert!(outcome.route.is_closed_loop());
    }

    #[tokio::test]
    async fn two_failures_then_success_uses_three_attempts() {
        let router = Arc::new(ScriptedRouter::new(2));
        let engine = RouteEngine::seeded(router.clone(), 11);

        let outcome = engine
            .generate_loop(START, DistanceSpec::kilometers(5.0))
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(router.calls(), 3);
    }

    #[tokio::test]
    async fn exhaustion_after_exactly_three_requests() {
        let router = Arc::new(ScriptedRouter::new(u32::MAX));
        let engine = RouteEngine::seeded(router.clone(), 11);

        let err = engine
            .generate_loop(START, DistanceSpec::kilometers(5.0))
            .await
            .unwrap_err();

        assert_eq!(router.calls(), MAX_ATTEMPTS);
        assert_eq!(
            err,
            RouteGenerationError::Exhausted {
                last: RoutingFailure {
                    status: RoutingStatus::ZeroResults
                }
            }
        );
    }

    #[tokio::test]
    async fn retries_use_fresh_waypoints() {
        let router = Arc::new(ScriptedRouter::new(2));
        let engine = RouteEngine::seeded(router.clone(), 5);

        engine
            .generate_loop(START, DistanceSpec::kilometers(5.0))
            .await
            .unwrap();

        let requests = router.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert_ne!(requests[0].waypoints, requests[1].waypoints);
        assert_ne!(requests[1].waypoints, requests[2].waypoints);
    }

    #[tokio::test]
    async fn request_shape_is_a_walking_loop() {
        let router = Arc::new(ScriptedRouter::new(0));
        let engine = RouteEngine::seeded(router.clone(), 1);

        engine
            .generate_loop(START, DistanceSpec::miles(3.0))
            .await
            .unwrap();

        let requests = router.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.origin, START);
        assert_eq!(request.destination, START);
        assert_eq!(request.mode, crate::models::TravelMode::Walking);
        assert!(request.optimize_waypoints);
        assert_eq!(request.waypoints.len(), DEFAULT_WAYPOINT_COUNT);
        assert!(request.waypoints.iter().all(|w| !w.stopover));
    }

    #[tokio::test]
    async fn invalid_distance_is_rejected_before_any_request() {
        let router = Arc::new(ScriptedRouter::new(0));
        let engine = RouteEngine::seeded(router.clone(), 1);

        let err = engine
            .generate_loop(START, DistanceSpec::kilometers(0.0))
            .await
            .unwrap_err();

        assert_eq!(err, RouteGenerationError::InvalidDistance);
        assert_eq!(router.calls(), 0);
    }

    #[tokio::test]
    async fn status_ok_without_result_counts_as_failure() {
        struct EmptyOk;

        #[async_trait]
        impl RoutingService for EmptyOk {
            async fn route(
                &self,
                _request: &RoutingRequest,
            ) -> (RoutingStatus, Option<RouteResult>) {
                (RoutingStatus::Ok, None)
            }
        }

        let engine = RouteEngine::seeded(Arc::new(EmptyOk), 1);
        let err = engine
            .generate_loop(START, DistanceSpec::kilometers(5.0))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RouteGenerationError::Exhausted {
                last: RoutingFailure {
                    status: RoutingStatus::Ok
                }
            }
        );
    }
}
