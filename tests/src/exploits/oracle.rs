//! # Validation Oracle
//!
//! ## Attack Vector
//!
//! Submit crafted tokens and envelopes and watch the responses for any
//! difference (status, headers, body) that reveals which validation step
//! failed: base64, RSA padding, JSON shape, or expiry.
//!
//! ## Expected Defense
//!
//! Every rejection is byte-for-byte the same 401. Only logs and counters see
//! the reason.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, GATEWAY_HEADER, TOKEN_HEADER};
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::Response;
    use axum::{routing::get, Router};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use nest_crypto::{AsymmetricCodec, CryptoError};
    use nest_service_auth::protect;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn snapshot(response: Response) -> (StatusCode, Vec<(String, String)>, Vec<u8>) {
        let status = response.status();
        let mut headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        headers.sort();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_all_rejections_identical() {
        let (gate, clock) = fixtures::gate();
        let app = protect(Router::new().route("/", get(|| async { "secret" })), gate.clone());
        let raw = AsymmetricCodec::new(fixtures::store());

        let expired = gate.tokens().issue().unwrap();
        let not_json = STANDARD.encode(raw.encrypt(b"not json").unwrap());
        let wrong_shape = STANDARD.encode(raw.encrypt(br#"{"exp":1}"#).unwrap());
        let empty_service =
            STANDARD.encode(raw.encrypt(br#"{"expiration":9999999999999,"service":""}"#).unwrap());
        let foreign = STANDARD.encode(
            AsymmetricCodec::new(fixtures::foreign_store())
                .encrypt(br#"{"expiration":9999999999999}"#)
                .unwrap(),
        );
        let tampered_envelope = {
            let mut wire: serde_json::Value =
                serde_json::from_str(&fixtures::sealed(&fixtures::claim(1))).unwrap();
            wire["key"] = serde_json::Value::String(STANDARD.encode([7u8; 256]));
            wire.to_string()
        };
        clock.advance(Duration::from_secs(30));

        let attempts: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![(TOKEN_HEADER, "!!!not-base64!!!")],
            vec![(TOKEN_HEADER, "AAAA")],
            vec![(TOKEN_HEADER, &not_json)],
            vec![(TOKEN_HEADER, &wrong_shape)],
            vec![(TOKEN_HEADER, &empty_service)],
            vec![(TOKEN_HEADER, &foreign)],
            vec![(TOKEN_HEADER, &expired)],
            vec![(GATEWAY_HEADER, &tampered_envelope)],
            vec![(GATEWAY_HEADER, "{}")],
        ];

        let mut seen = Vec::new();
        for headers in &attempts {
            let response = app
                .clone()
                .oneshot(fixtures::request("/", headers))
                .await
                .unwrap();
            seen.push(snapshot(response).await);
        }

        let first = &seen[0];
        assert_eq!(first.0, StatusCode::UNAUTHORIZED);
        for (i, other) in seen.iter().enumerate() {
            assert_eq!(other, first, "attempt {} distinguishable", i);
        }
        assert!(!first.2.windows(6).any(|w| w == b"secret"));

        // The reasons still reach the counters
        let s = gate.metrics().snapshot();
        assert_eq!(s.rejected_total(), attempts.len() as u64);
        assert_eq!(s.rejected_expired, 1);
        assert_eq!(s.rejected_unauthenticated, 3);
    }

    #[test]
    fn test_asymmetric_failures_collapse() {
        let codec = AsymmetricCodec::new(fixtures::store());
        let mut valid = codec.encrypt(b"k").unwrap();
        valid[10] ^= 1;

        let inputs: Vec<Vec<u8>> = vec![
            vec![],
            vec![0u8; 256],
            vec![0xffu8; 256],
            valid,
            vec![1u8; 300],
        ];
        for input in inputs {
            assert_eq!(codec.decrypt(&input), Err(CryptoError::DecryptionFailed));
        }
    }
}
