//! # Trust Benchmarks
//!
//! Criterion bodies, driven from `benches/trust_benchmarks.rs`.
//!
//! Expectations on a 2048-bit key:
//! - Symmetric seal/open: microseconds, linear in payload size
//! - Anything touching the RSA private key: around a millisecond
//! - Gateway and token evaluation: dominated by one RSA decrypt each

pub mod crypto;
pub mod trust;
