//! Server construction: middleware stack and routes.

use std::net::TcpListener;

use actix_web::{App, HttpServer, dev::Server, web};
use tracing_actix_web::TracingLogger;

use crate::{AppState, handlers, telemetry::RequestLoggingMiddleware};

/// Builds the HTTP server on an already bound `listener`.
///
/// The returned [`Server`] does nothing until awaited or spawned. Binding the
/// listener up front lets callers pick port `0` and read the assigned port.
///
/// # Errors
/// Returns an I/O error if the listener cannot be handed to Actix.
pub fn run(listener: TcpListener, app_state: AppState) -> std::io::Result<Server> {
    let app_state = web::Data::new(app_state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(RequestLoggingMiddleware::new())
            .wrap(TracingLogger::default())
            .configure(handlers::configure_health_routes)
    })
    .listen(listener)?
    .run();
    Ok(server)
}
