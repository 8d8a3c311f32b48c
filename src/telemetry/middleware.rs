//! Request logging middleware for HTTP request/response tracking.
//!
//! Every request is logged on completion with its method, path, status code
//! and latency. A request id is generated per request and echoed back in the
//! `x-request-id` response header so callers can correlate log lines.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
};
use futures::future::{Ready, ok};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use uuid::Uuid;

/// Response header carrying the generated request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests slower than this are additionally logged as slow.
const SLOW_REQUEST_THRESHOLD_MS: u128 = 2000;

/// Request logging middleware.
#[derive(Clone)]
pub struct RequestLoggingMiddleware;

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RequestLoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingService { service })
    }
}

/// Request logging service implementation.
pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            let duration_ms = start_time.elapsed().as_millis();
            let status_code = response.status().as_u16();

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if response.status().is_server_error() {
                tracing::error!(
                    http.request_id = %request_id,
                    http.method = %method,
                    http.path = %path,
                    http.status = status_code,
                    http.duration_ms = duration_ms as u64,
                    http.remote_addr = %remote_addr,
                    http.user_agent = %user_agent,
                    "HTTP request failed"
                );
            } else {
                tracing::info!(
                    http.request_id = %request_id,
                    http.method = %method,
                    http.path = %path,
                    http.status = status_code,
                    http.duration_ms = duration_ms as u64,
                    http.remote_addr = %remote_addr,
                    http.user_agent = %user_agent,
                    "HTTP request completed"
                );
            }

            if duration_ms > SLOW_REQUEST_THRESHOLD_MS {
                tracing::warn!(
                    http.request_id = %request_id,
                    threshold_ms = SLOW_REQUEST_THRESHOLD_MS as u64,
                    "Slow request detected: {} {} ({}ms)",
                    method, path, duration_ms
                );
            }

            Ok(response)
        })
    }
}
