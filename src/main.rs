//! Main entry point for the vitals server.
//!
//! Loads configuration, initializes tracing, builds the shared application
//! state (readiness probe backed by a Postgres pool) and serves the health
//! endpoint until Ctrl-C.

use std::net::TcpListener;

use anyhow::Context;
use dotenv::dotenv;
use vitals::{AppState, Settings, startup, telemetry};

/// Main entry point. Configures and runs the Actix Web server.
///
/// - Loads environment variables from `.env`.
/// - Initializes Bunyan JSON tracing on stdout.
/// - Reads [`Settings`] and builds a lazily connected database pool.
/// - Serves until the server stops or a shutdown signal arrives.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber =
        telemetry::get_subscriber("vitals".to_string(), "info".to_string(), std::io::stdout);
    telemetry::init_subscriber(subscriber);

    let settings = Settings::from_env().context("failed to read configuration")?;
    let app_state = AppState::new(&settings).context("failed to init app_state")?;

    let address = settings.address();
    let listener =
        TcpListener::bind(&address).with_context(|| format!("unable to bind {address}"))?;
    tracing::info!(
        address = %address,
        probe_timeout = %humantime::format_duration(settings.probe_timeout),
        "Listening"
    );

    let server = startup::run(listener, app_state)?;
    let srv_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            // Gracefully stop the server
            srv_handle.stop(true).await;
        }
        res = server_task => {
            match res {
                Ok(Err(e)) => tracing::error!("Server failed: {}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    Ok(())
}
