//! Handler module organization for the vitals server.
//!
//! Re-exports the health handler and its route configuration.

pub mod health;

pub use health::{check_health, configure_health_routes, health_check};
