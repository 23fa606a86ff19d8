//! Request spans for protected routes.
//!
//! Each request gets an `internal_request` span. The trust layer records its
//! outcome into the span's `trust` field when it runs inside it.

use axum::{body::Body, http::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{info_span, Instrument, Span};

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let span = info_span!(
            "internal_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            request_id = tracing::field::Empty,
            trace_id = tracing::field::Empty,
            trust = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        );

        if let Some(id) = header_str(&req, "x-request-id") {
            span.record("request_id", id);
        }
        if let Some(trace_id) = trace_id(&req) {
            span.record("trace_id", trace_id);
        }

        Box::pin(
            async move {
                let result = inner.call(req).await;
                if let Ok(response) = &result {
                    Span::current().record("http.status_code", response.status().as_u16());
                }
                result
            }
            .instrument(span),
        )
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name)?.to_str().ok()
}

/// Trace id from a W3C `traceparent` header.
fn trace_id<B>(req: &Request<B>) -> Option<&str> {
    // version-trace_id-parent_id-trace_flags
    let traceparent = header_str(req, "traceparent")?;
    let mut parts = traceparent.split('-');
    let (_version, trace_id, _parent, _flags) =
        (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || trace_id.len() != 32 {
        return None;
    }
    Some(trace_id)
}
