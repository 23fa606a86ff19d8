//! # Nest Service Auth Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | Symmetric | AES-256-GCM 1 KiB | < 10μs |
//! | Asymmetric | RSA-2048 private decrypt | < 5ms |
//! | Hybrid | Envelope open | < 5ms |
//! | Gate | Token or gateway evaluation | < 5ms |
//! | Gate | Anonymous rejection | < 10μs |

use criterion::{criterion_group, criterion_main};
use nest_tests::benchmarks::{crypto, trust};

criterion_group!(
    benches,
    crypto::bench_symmetric,
    crypto::bench_asymmetric,
    crypto::bench_hybrid,
    trust::bench_tokens,
    trust::bench_evaluate,
    trust::bench_middleware,
);
criterion_main!(benches);
