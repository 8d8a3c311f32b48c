//! Database connection utilities for the vitals server.
//!
//! Provides functions to build Postgres connect options and a connection pool from [`Settings`].

use std::time::Duration;

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::config::Settings;

/// Parses `database_url` into connect options.
///
/// # Errors
/// Returns [`sqlx::Error`] if `database_url` is not a valid Postgres URL.
pub fn connect_options(settings: &Settings) -> Result<PgConnectOptions, sqlx::Error> {
    settings.database_url.parse()
}

/// How long the pool waits for a connection before giving up.
///
/// Half the probe timeout, so a failed acquire still leaves time for one
/// direct connect attempt that surfaces the real cause.
pub fn acquire_timeout(probe_timeout: Duration) -> Duration {
    probe_timeout / 2
}

/// Builds a lazily connected Postgres pool.
///
/// No connection is opened until the first query, so the server can boot and
/// report an unhealthy database instead of refusing to start.
pub fn connect_pg_pool(settings: &Settings, options: PgConnectOptions) -> PgPool {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(acquire_timeout(settings.probe_timeout))
        .connect_lazy_with(options)
}
