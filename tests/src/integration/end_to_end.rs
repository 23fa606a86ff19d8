//! # End-to-End Trust Flows
//!
//! A calling service issues tokens with the public key only; the receiving
//! service verifies with the private key. The gateway seals identities with
//! the same public key.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, GATEWAY_HEADER, T0, TOKEN_HEADER};
    use axum::http::StatusCode;
    use axum::{routing::get, Router};
    use nest_crypto::HybridCodec;
    use nest_service_auth::{
        protect, AuthError, RejectReason, TokenCodec, TrustConfig, TrustDecision, TrustPath,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    // =============================================================================
    // TOKEN LIFECYCLE
    // =============================================================================

    #[test]
    fn test_issue_validate_then_expire() {
        let (gate, clock) = fixtures::gate();
        let issuer = TokenCodec::new(fixtures::public_only_store(), Duration::from_secs(10))
            .with_time_source(clock.clone());

        let token = issuer.issue().unwrap();
        let req = fixtures::request("/", &[(TOKEN_HEADER, &token)]);
        assert!(matches!(
            gate.evaluate(&req),
            TrustDecision::Allowed(TrustPath::ServiceToken(_))
        ));

        clock.advance(Duration::from_secs(15));
        assert_eq!(
            gate.evaluate(&req),
            TrustDecision::Rejected(RejectReason::Expired)
        );
    }

    #[test]
    fn test_ttl_window_nine_and_eleven_seconds() {
        let (gate, clock) = fixtures::gate();
        let token = gate.tokens().issue().unwrap();

        clock.set(T0 + 9_000);
        assert!(gate.tokens().validate(&token).is_ok());

        clock.set(T0 + 11_000);
        assert!(matches!(
            gate.tokens().validate(&token),
            Err(AuthError::Expired { .. })
        ));
    }

    #[test]
    fn test_longer_ttl_tolerates_skew() {
        let mut config = TrustConfig::default();
        config.token.ttl = Duration::from_secs(30);
        let (gate, clock) = fixtures::gate_with(config);

        let token = gate.tokens().issue().unwrap();
        clock.advance(Duration::from_secs(15));
        assert!(gate
            .evaluate(&fixtures::request("/", &[(TOKEN_HEADER, &token)]))
            .is_allowed());
    }

    // =============================================================================
    // GATEWAY ASSERTIONS
    // =============================================================================

    #[test]
    fn test_gateway_assertion_roundtrip() {
        let (gate, _) = fixtures::gate();
        let claim = fixtures::claim(1001);
        let req = fixtures::request("/", &[(GATEWAY_HEADER, &fixtures::sealed(&claim))]);

        assert_eq!(
            gate.evaluate(&req),
            TrustDecision::Allowed(TrustPath::Gateway(claim))
        );
    }

    #[test]
    fn test_hybrid_open_matches_seal() {
        let codec = HybridCodec::new(fixtures::store());
        let message = vec![0x5a; 64 * 1024];
        let envelope = HybridCodec::new(fixtures::public_only_store())
            .seal(&message)
            .unwrap();
        assert_eq!(codec.open(&envelope).unwrap(), message);
    }

    // =============================================================================
    // REJECTION PATHS
    // =============================================================================

    #[test]
    fn test_no_headers_unauthenticated() {
        let (gate, _) = fixtures::gate();
        assert_eq!(
            gate.evaluate(&fixtures::request("/", &[])),
            TrustDecision::Rejected(RejectReason::Unauthenticated)
        );
    }

    #[test]
    fn test_tampered_envelope_without_token_rejected() {
        let (gate, _) = fixtures::gate();
        let sealed = fixtures::sealed(&fixtures::claim(7));
        let mut wire: serde_json::Value = serde_json::from_str(&sealed).unwrap();
        let nonce = wire["nonce"].as_str().unwrap().to_string();
        let mut flipped = nonce.into_bytes();
        flipped[0] = if flipped[0] == b'A' { b'B' } else { b'A' };
        wire["nonce"] = serde_json::Value::String(String::from_utf8(flipped).unwrap());

        let req = fixtures::request("/", &[(GATEWAY_HEADER, &wire.to_string())]);
        assert_eq!(
            gate.evaluate(&req),
            TrustDecision::Rejected(RejectReason::Unauthenticated)
        );
        assert_eq!(gate.metrics().snapshot().gateway_fallthrough, 1);
    }

    // =============================================================================
    // HTTP LAYER
    // =============================================================================

    #[tokio::test]
    async fn test_protected_router_end_to_end() {
        let (gate, clock) = fixtures::gate();
        let app = protect(
            Router::new().route("/orders", get(|| async { "ok" })),
            gate.clone(),
        );

        let token = gate.tokens().issue_for("checkout").unwrap();
        let sealed = fixtures::sealed(&fixtures::claim(5));

        let cases: Vec<(Vec<(&str, &str)>, StatusCode)> = vec![
            (vec![], StatusCode::UNAUTHORIZED),
            (vec![(TOKEN_HEADER, token.as_str())], StatusCode::OK),
            (vec![(GATEWAY_HEADER, sealed.as_str())], StatusCode::OK),
            (vec![(TOKEN_HEADER, "garbage")], StatusCode::UNAUTHORIZED),
        ];

        for (headers, expected) in cases {
            let response = app
                .clone()
                .oneshot(fixtures::request("/orders", &headers))
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "headers {:?}", headers);
        }

        clock.advance(Duration::from_secs(11));
        let response = app
            .oneshot(fixtures::request("/orders", &[(TOKEN_HEADER, &token)]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let s = gate.metrics().snapshot();
        assert_eq!(s.allowed_token, 1);
        assert_eq!(s.allowed_gateway, 1);
        assert_eq!(s.rejected_total(), 3);
    }

    #[tokio::test]
    async fn test_outbound_header_helper_is_accepted() {
        let (gate, _) = fixtures::gate();
        let app = protect(Router::new().route("/", get(|| async { "ok" })), gate.clone());

        let (name, value) = gate.tokens().header(gate.token_header()).unwrap();
        let mut req = fixtures::request("/", &[]);
        req.headers_mut().insert(name, value);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
