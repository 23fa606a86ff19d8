//! # Codec Benchmarks
//!
//! Raw cost of the three codecs without any HTTP or config around them.

use crate::fixtures;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use nest_crypto::{AsymmetricCodec, HybridCodec, SecretKey};
use std::time::Duration;

pub fn bench_symmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("symmetric-aes-256-gcm");
    let key = SecretKey::generate();

    for size in [64usize, 1024, 16 * 1024] {
        let payload = vec![0xa5u8; size];
        let (ciphertext, nonce) =
            nest_crypto::encrypt(&payload, key.as_bytes()).expect("encrypt");

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encrypt", size), &payload, |b, p| {
            b.iter(|| black_box(nest_crypto::encrypt(p, key.as_bytes())))
        });
        group.bench_with_input(BenchmarkId::new("decrypt", size), &ciphertext, |b, ct| {
            b.iter(|| black_box(nest_crypto::decrypt(ct, key.as_bytes(), nonce.as_bytes())))
        });
    }
    group.finish();
}

pub fn bench_asymmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("asymmetric-rsa-2048");
    group.measurement_time(Duration::from_secs(10));

    let codec = AsymmetricCodec::new(fixtures::store());
    let message = br#"{"expiration":1700000010000}"#;
    let ciphertext = codec.encrypt(message).expect("encrypt");

    group.bench_function("encrypt_public", |b| {
        b.iter(|| black_box(codec.encrypt(message)))
    });
    group.bench_function("decrypt_private", |b| {
        b.iter(|| black_box(codec.decrypt(&ciphertext)))
    });

    // Failure path must cost about the same as success
    let mut corrupt = ciphertext.clone();
    corrupt[0] ^= 1;
    group.bench_function("decrypt_corrupt", |b| {
        b.iter(|| black_box(codec.decrypt(&corrupt)))
    });
    group.finish();
}

pub fn bench_hybrid(c: &mut Criterion) {
    let mut group = c.benchmark_group("hybrid-envelope");
    group.measurement_time(Duration::from_secs(10));

    let codec = HybridCodec::new(fixtures::store());
    let claim = br#"{"userId":42,"isAdmin":false}"#;
    let envelope = codec.seal(claim).expect("seal");
    let header = envelope.to_header_value().expect("wire form");

    group.bench_function("seal", |b| b.iter(|| black_box(codec.seal(claim))));
    group.bench_function("open", |b| b.iter(|| black_box(codec.open(&envelope))));
    group.bench_function("open_header_value", |b| {
        b.iter(|| black_box(codec.open_header_value(&header)))
    });
    group.finish();
}
