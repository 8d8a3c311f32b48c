//! Library entry point for the vitals server.
//!
//! Exports all core modules for use in integration tests and by the main binary.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod probe;
pub mod startup;
pub mod telemetry;

pub use config::Settings;
pub use models::{AppState, HealthResponse, HealthyResponse, UnhealthyResponse};
pub use probe::{PgProbe, ProbeError, ReadinessProbe};
