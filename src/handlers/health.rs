//! Health check endpoint for the vitals server.
//!
//! Runs a readiness probe against the database and reports the outcome for
//! monitoring and orchestration.

use std::time::Duration;

use actix_web::{HttpResponse, http::StatusCode, web};

use crate::{
    AppState,
    models::{HealthResponse, HealthyResponse, UnhealthyResponse},
    probe::{ProbeError, ReadinessProbe},
    telemetry::FailureReporter,
};

/// Runs `probe` once, bounded by `timeout`, and builds the matching response.
///
/// Failures (including an expired timeout) are passed to `reporter` and
/// turned into an [`UnhealthyResponse`] with `500`. This function never fails
/// itself.
pub async fn check_health(
    probe: &dyn ReadinessProbe,
    reporter: &dyn FailureReporter,
    timeout: Duration,
) -> (StatusCode, HealthResponse) {
    let outcome = match tokio::time::timeout(timeout, probe.probe()).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::TimedOut(timeout)),
    };

    match outcome {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse::Healthy(HealthyResponse::now()),
        ),
        Err(err) => {
            reporter.probe_failed(&err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HealthResponse::Unhealthy(UnhealthyResponse::from_error(&err)),
            )
        }
    }
}

/// Reports whether the service can reach its database.
///
/// # HTTP Method
/// `GET /health` (also `GET /api/health`)
///
/// # Success Response (200 OK)
/// ```json
/// { "status": "ok", "database": "connected", "timestamp": "2024-01-01T00:00:00.000Z" }
/// ```
///
/// # Error Response (500 Internal Server Error)
/// ```json
/// {
///   "status": "error",
///   "message": "Database connection failed",
///   "error": "connection timed out",
///   "timestamp": "2024-01-01T00:00:05.000Z"
/// }
/// ```
///
/// If the client disconnects, Actix drops this future and the in-flight probe
/// with it.
#[tracing::instrument(name = "Health check", skip(state))]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, body) = check_health(
        state.probe.as_ref(),
        state.reporter.as_ref(),
        state.probe_timeout,
    )
    .await;
    HttpResponse::build(status).json(body)
}

/// Registers the health endpoint at `/health` and `/api/health`.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/api/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TracingReporter;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Healthy;

    #[async_trait]
    impl ReadinessProbe for Healthy {
        async fn probe(&self) -> Result<(), ProbeError> {
            Ok(())
        }
    }

    struct Failing(&'static str);

    #[async_trait]
    impl ReadinessProbe for Failing {
        async fn probe(&self) -> Result<(), ProbeError> {
            Err(ProbeError::other(self.0))
        }
    }

    struct Hanging;

    #[async_trait]
    impl ReadinessProbe for Hanging {
        async fn probe(&self) -> Result<(), ProbeError> {
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl FailureReporter for Recording {
        fn probe_failed(&self, error: &ProbeError) {
            self.0.lock().unwrap().push(error.description());
        }
    }

    #[tokio::test]
    async fn healthy_probe_yields_ok() {
        let reporter = Recording::default();
        let (status, body) = check_health(&Healthy, &reporter, Duration::from_secs(1)).await;

        assert_eq!(status, StatusCode::OK);
        match body {
            HealthResponse::Healthy(r) => {
                assert_eq!(r.status, "ok");
                assert_eq!(r.database, "connected");
            }
            other => panic!("expected healthy response, got {other:?}"),
        }
        assert!(reporter.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_probe_is_reported_once() {
        let reporter = Recording::default();
        let (status, body) = check_health(
            &Failing("connection timed out"),
            &reporter,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        match body {
            HealthResponse::Unhealthy(r) => {
                assert_eq!(r.status, "error");
                assert_eq!(r.message, "Database connection failed");
                assert_eq!(r.error, "connection timed out");
            }
            other => panic!("expected unhealthy response, got {other:?}"),
        }
        assert_eq!(
            *reporter.0.lock().unwrap(),
            vec!["connection timed out".to_string()]
        );
    }

    #[tokio::test]
    async fn failure_without_description_uses_fallback() {
        let (status, body) =
            check_health(&Failing(""), &TracingReporter, Duration::from_secs(1)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        match body {
            HealthResponse::Unhealthy(r) => assert_eq!(r.error, "Unknown error"),
            other => panic!("expected unhealthy response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hanging_probe_times_out() {
        let reporter = Recording::default();
        let (status, body) = check_health(&Hanging, &reporter, Duration::from_millis(50)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        match body {
            HealthResponse::Unhealthy(r) => assert_eq!(r.error, "probe timed out after 50ms"),
            other => panic!("expected unhealthy response, got {other:?}"),
        }
        assert_eq!(reporter.0.lock().unwrap().len(), 1);
    }
}
