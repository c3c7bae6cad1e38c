use crate::core::Handler;
use crate::{
    core::{Request, Response},
    error::WebError,
    middleware::{Middleware, REQUEST_ID_HEADER},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Instrument, info};

/// Opens an `info` span per request carrying the request id, method and
/// path, and records status and latency when the request completes.
///
/// Handler errors are turned into responses inside the span, so the error
/// log line carries the request context. Register it inside [`RequestId`]
/// so the id is already on the request.
///
/// [`RequestId`]: crate::middleware::RequestId
#[derive(Clone, Default)]
pub struct TracingMiddleware;

impl TracingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for TracingMiddleware {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let span = tracing::info_span!(
            "request",
            request_id = request_id.as_str(),
            method = req.method().as_str(),
            path = req.path(),
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        );
        let span_for_record = span.clone();

        async move {
            info!("request started");
            let start_time = std::time::Instant::now();

            let res = next
                .handle(req)
                .await
                .unwrap_or_else(WebError::into_response);

            span_for_record.record("status", res.status.as_u16());
            span_for_record.record("latency_ms", start_time.elapsed().as_millis() as u64);
            info!("request completed");

            Ok(res)
        }
        .instrument(span)
        .await
    }
}
