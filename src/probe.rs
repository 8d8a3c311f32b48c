//! Readiness probes run by the health endpoint.
//!
//! A probe performs the smallest possible round-trip against a dependency and
//! reports whether it succeeded. The handler only depends on the
//! [`ReadinessProbe`] trait, so tests can substitute their own.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, PgPool, postgres::PgConnectOptions};
use thiserror::Error;

/// Description used when a failure carries no text of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of a readiness probe.
///
/// Variants exist for logging only; every variant is reported to clients the
/// same way.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The database rejected the query or could not be reached.
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    /// The probe did not finish within the configured bound.
    #[error("probe timed out after {}", humantime::format_duration(*.0))]
    TimedOut(Duration),
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// Builds an [`ProbeError::Other`] from free-form text.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Human-readable description of the failure, never empty.
    pub fn description(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            text
        }
    }
}

/// A lightweight check that a dependency is able to serve requests.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Runs the check once.
    async fn probe(&self) -> Result<(), ProbeError>;
}

/// Checks Postgres reachability with `SELECT 1`.
///
/// The pool hides connect failures behind [`sqlx::Error::PoolTimedOut`] while
/// it retries. When that happens the probe opens one connection directly so
/// the response carries the actual cause (refused, auth failure, DNS, ...).
#[derive(Clone)]
pub struct PgProbe {
    pool: PgPool,
    options: PgConnectOptions,
}

impl PgProbe {
    pub fn new(pool: PgPool, options: PgConnectOptions) -> Self {
        Self { pool, options }
    }

    async fn probe_direct(&self) -> Result<(), ProbeError> {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl ReadinessProbe for PgProbe {
    async fn probe(&self) -> Result<(), ProbeError> {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(sqlx::Error::PoolTimedOut) => {
                tracing::debug!("Pool acquire timed out, retrying with a direct connection");
                self.probe_direct().await
            }
            Err(e) => Err(e.into()),
        }
    }
}
