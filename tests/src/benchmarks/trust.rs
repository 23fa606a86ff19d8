//! # Trust Gate Benchmarks
//!
//! Per-request cost of each path through the gate, plus the full
//! middleware stack under tokio.

use crate::fixtures::{self, GATEWAY_HEADER, TOKEN_HEADER};
use axum::{routing::get, Router};
use criterion::{black_box, Criterion};
use nest_service_auth::protect;
use std::time::Duration;
use tower::ServiceExt;

pub fn bench_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("service-token");
    group.measurement_time(Duration::from_secs(10));

    let (gate, _clock) = fixtures::gate();
    let tokens = gate.tokens();
    let token = tokens.issue().expect("issue");

    group.bench_function("issue", |b| b.iter(|| black_box(tokens.issue())));
    group.bench_function("validate", |b| {
        b.iter(|| black_box(tokens.validate(&token)))
    });
    group.bench_function("validate_malformed", |b| {
        b.iter(|| black_box(tokens.validate("!!!")))
    });
    group.finish();
}

pub fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("trust-gate-evaluate");
    group.measurement_time(Duration::from_secs(10));

    let (gate, _clock) = fixtures::gate();
    let token = gate.tokens().issue().expect("issue");
    let sealed = fixtures::sealed(&fixtures::claim(42));

    let via_gateway = fixtures::request("/", &[(GATEWAY_HEADER, &sealed)]);
    let via_token = fixtures::request("/", &[(TOKEN_HEADER, &token)]);
    let fallthrough = fixtures::request("/", &[(GATEWAY_HEADER, "{}"), (TOKEN_HEADER, &token)]);
    let anonymous = fixtures::request("/", &[]);
    let query = fixtures::request(&format!("/?{}={}", TOKEN_HEADER, urlencode(&token)), &[]);

    group.bench_function("gateway", |b| b.iter(|| black_box(gate.evaluate(&via_gateway))));
    group.bench_function("token", |b| b.iter(|| black_box(gate.evaluate(&via_token))));
    group.bench_function("token_query", |b| b.iter(|| black_box(gate.evaluate(&query))));
    group.bench_function("gateway_fallthrough", |b| {
        b.iter(|| black_box(gate.evaluate(&fallthrough)))
    });
    group.bench_function("anonymous", |b| b.iter(|| black_box(gate.evaluate(&anonymous))));
    group.finish();
}

pub fn bench_middleware(c: &mut Criterion) {
    let mut group = c.benchmark_group("trust-middleware");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let (gate, _clock) = fixtures::gate();
    let token = gate.tokens().issue().expect("issue");
    let app = protect(Router::new().route("/", get(|| async { "ok" })), gate);

    group.bench_function("allowed", |b| {
        b.iter(|| {
            let req = fixtures::request("/", &[(TOKEN_HEADER, &token)]);
            black_box(runtime.block_on(app.clone().oneshot(req)))
        })
    });
    group.bench_function("rejected", |b| {
        b.iter(|| {
            let req = fixtures::request("/", &[]);
            black_box(runtime.block_on(app.clone().oneshot(req)))
        })
    });
    group.finish();
}

/// Base64 only needs `+`, `/` and `=` escaped in a query string.
fn urlencode(value: &str) -> String {
    value
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
}
