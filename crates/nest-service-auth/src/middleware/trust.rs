//! Trust enforcement as a tower layer.
//!
//! Every rejection produces the same 401 whatever the reason, so callers
//! cannot tell which validation step failed.

use crate::gate::{TrustDecision, TrustGate};
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::Span;

/// Layer that puts a [`TrustGate`] in front of a service.
#[derive(Clone)]
pub struct TrustLayer {
    gate: Arc<TrustGate>,
}

impl TrustLayer {
    pub fn new(gate: TrustGate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }

    pub fn gate(&self) -> &TrustGate {
        &self.gate
    }
}

impl<S> Layer<S> for TrustLayer {
    type Service = TrustService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TrustService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Service produced by [`TrustLayer`]
#[derive(Clone)]
pub struct TrustService<S> {
    inner: S,
    gate: Arc<TrustGate>,
}

impl<S> Service<Request<Body>> for TrustService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let decision = self.gate.evaluate(&req);
        let challenge = self.gate.token_header().clone();
        Span::current().record("trust", decision.label());

        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match decision {
                TrustDecision::Allowed(_) => inner.call(req).await,
                TrustDecision::Rejected(_) => Ok(unauthorized_response(challenge.as_str())),
            }
        })
    }
}

/// Generic 401. The body never varies with the rejection reason.
pub fn unauthorized_response(challenge: &str) -> Response {
    let body = serde_json::json!({
        "code": 401,
        "message": "unauthorized",
    });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("{} realm=\"internal\"", challenge)) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }

    response
}
