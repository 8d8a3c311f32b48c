//! Response models and shared application state.
//!
//! Health responses are built per request and serialized straight to JSON.
//! Nothing here is persisted.

use std::{sync::Arc, time::Duration};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    config::Settings,
    db,
    probe::{PgProbe, ProbeError, ReadinessProbe},
    telemetry::{FailureReporter, TracingReporter},
};

/// Message returned to clients whenever the readiness probe fails.
pub const DATABASE_FAILURE_MESSAGE: &str = "Database connection failed";

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// e.g. `2024-01-01T00:00:00.000Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body returned with `200 OK` when the database answered the probe.
///
/// ```json
/// { "status": "ok", "database": "connected", "timestamp": "2024-01-01T00:00:00.000Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthyResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Always `"connected"`.
    pub database: String,
    /// Moment the response was built.
    pub timestamp: String,
}

impl HealthyResponse {
    pub fn now() -> Self {
        Self {
            status: "ok".into(),
            database: "connected".into(),
            timestamp: iso_timestamp(),
        }
    }
}

/// Body returned with `500 Internal Server Error` when the probe failed.
///
/// ```json
/// {
///   "status": "error",
///   "message": "Database connection failed",
///   "error": "connection timed out",
///   "timestamp": "2024-01-01T00:00:05.000Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnhealthyResponse {
    /// Always `"error"`.
    pub status: String,
    /// Always [`DATABASE_FAILURE_MESSAGE`].
    pub message: String,
    /// Description of the underlying failure, or `"Unknown error"`.
    pub error: String,
    /// Moment the response was built.
    pub timestamp: String,
}

impl UnhealthyResponse {
    pub fn from_error(error: &ProbeError) -> Self {
        Self {
            status: "error".into(),
            message: DATABASE_FAILURE_MESSAGE.into(),
            error: error.description(),
            timestamp: iso_timestamp(),
        }
    }
}

/// One of the two health response shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    Unhealthy(UnhealthyResponse),
    Healthy(HealthyResponse),
}

/// Shared application state for all handlers.
///
/// Holds the readiness probe, the failure reporter and the probe bound.
#[derive(Clone)]
pub struct AppState {
    /// Dependency check run by the health endpoint
    pub probe: Arc<dyn ReadinessProbe>,
    /// Receives diagnostics when the probe fails
    pub reporter: Arc<dyn FailureReporter>,
    /// Upper bound on a single probe
    pub probe_timeout: Duration,
}

impl AppState {
    /// Builds state backed by a lazily connected Postgres pool.
    ///
    /// No connection is attempted here; an unreachable database shows up as an
    /// unhealthy response rather than a startup failure.
    ///
    /// # Errors
    /// Returns an error if `settings.database_url` is not a valid Postgres URL.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let options = db::connect_options(settings)?;
        let pool = db::connect_pg_pool(settings, options.clone());
        Ok(Self::with_probe(
            PgProbe::new(pool, options),
            TracingReporter,
            settings.probe_timeout,
        ))
    }

    /// Builds state around an arbitrary probe and reporter.
    pub fn with_probe(
        probe: impl ReadinessProbe + 'static,
        reporter: impl FailureReporter + 'static,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe: Arc::new(probe),
            reporter: Arc::new(reporter),
            probe_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn healthy_shape_serializes_exactly() {
        let resp = HealthyResponse::now();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({"status": "ok", "database": "connected", "timestamp": resp.timestamp})
        );
    }

    #[test]
    fn unhealthy_shape_serializes_exactly() {
        let resp = UnhealthyResponse::from_error(&ProbeError::other("connection timed out"));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "error",
                "message": "Database connection failed",
                "error": "connection timed out",
                "timestamp": resp.timestamp,
            })
        );
    }

    #[test]
    fn field_order_matches_wire_format() {
        let resp = HealthResponse::Healthy(HealthyResponse {
            status: "ok".into(),
            database: "connected".into(),
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        });
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"status":"ok","database":"connected","timestamp":"2024-01-01T00:00:00.000Z"}"#
        );
    }

    #[test]
    fn untagged_enum_serializes_only_the_inner_shape() {
        let err = ProbeError::other("x");
        let value = serde_json::to_value(HealthResponse::Unhealthy(
            UnhealthyResponse::from_error(&err),
        ))
        .unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert!(keys.iter().all(|k| ["status", "message", "error", "timestamp"].contains(k)));
    }

    #[test]
    fn timestamp_is_iso8601_with_millis() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'));
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(ts.len(), 24);
        let parsed = DateTime::parse_from_rfc3339(&ts).unwrap();
        let drift = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
        assert!(drift.num_seconds().abs() < 5);
    }
}
