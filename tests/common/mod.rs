//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use vitals::{
    AppState, ProbeError, ReadinessProbe,
    telemetry::{TracingReporter, get_subscriber, init_subscriber},
};

// Ensure that the `tracing` stack is only initialized once.
static TRACING: Lazy<()> = Lazy::new(|| {
    // Logs are only printed when `TEST_LOG` is set, e.g. `TEST_LOG=1 cargo test | bunyan`.
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::stdout));
    } else {
        init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::sink));
    }
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Probe that always succeeds.
pub struct AlwaysUp;

#[async_trait]
impl ReadinessProbe for AlwaysUp {
    async fn probe(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// Probe that always fails with the given text.
pub struct AlwaysDown(pub &'static str);

#[async_trait]
impl ReadinessProbe for AlwaysDown {
    async fn probe(&self) -> Result<(), ProbeError> {
        Err(ProbeError::other(self.0))
    }
}

pub fn state_with(probe: impl ReadinessProbe + 'static) -> AppState {
    init_tracing();
    AppState::with_probe(probe, TracingReporter, Duration::from_secs(2))
}
