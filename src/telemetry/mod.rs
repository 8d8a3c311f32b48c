//! Logging and tracing infrastructure for the vitals server.
//!
//! This module provides:
//! - Bunyan-formatted JSON logs on a configurable sink
//! - Request/response logging middleware
//! - The failure reporting capability injected into the health handler

pub mod middleware;

use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

use crate::probe::ProbeError;

/// Request logging middleware
pub use middleware::RequestLoggingMiddleware;

/// Composes the application's tracing subscriber.
///
/// `RUST_LOG` takes precedence over `env_filter` when it is set. Output goes
/// to `sink` as Bunyan JSON, which lets tests pass `std::io::sink`.
///
/// # Example
/// ```rust,no_run
/// use vitals::telemetry::{get_subscriber, init_subscriber};
///
/// let subscriber = get_subscriber("vitals".into(), "info".into(), std::io::stdout);
/// init_subscriber(subscriber);
/// ```
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default and routes `log` records into it.
///
/// # Panics
/// Panics if called more than once per process.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

/// Receives diagnostics when a readiness probe fails.
///
/// The health handler holds one of these instead of logging through a global,
/// so tests can observe exactly what was reported.
pub trait FailureReporter: Send + Sync {
    /// Called once per failed probe, before the error response is built.
    fn probe_failed(&self, error: &ProbeError);
}

/// Reports probe failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn probe_failed(&self, error: &ProbeError) {
        tracing::error!(
            error.message = %error.description(),
            error.details = ?error,
            "Health check failed"
        );
    }
}
