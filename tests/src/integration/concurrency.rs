//! # Concurrent Validation
//!
//! Many tasks validating against one immutable key snapshot must agree with
//! a sequential run.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, TOKEN_HEADER};
    use nest_service_auth::{RejectReason, TrustDecision};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_parallel_validate_matches_sequential() {
        let (gate, _) = fixtures::gate();

        let valid: Vec<String> = (0..16).map(|_| gate.tokens().issue().unwrap()).collect();
        let foreign =
            nest_service_auth::TokenCodec::new(fixtures::foreign_store(), Duration::from_secs(10))
                .issue()
                .unwrap();
        let mut inputs: Vec<String> = valid.clone();
        inputs.push(foreign);
        inputs.push("bm90IGEgdG9rZW4=".to_string());
        inputs.push("***".to_string());

        let sequential: Vec<bool> = inputs
            .iter()
            .map(|t| gate.tokens().validate(t).is_ok())
            .collect();

        let gate = Arc::new(gate);
        let mut handles = Vec::new();
        for _ in 0..8 {
            for (i, token) in inputs.iter().enumerate() {
                let gate = Arc::clone(&gate);
                let token = token.clone();
                handles.push(tokio::spawn(async move {
                    (i, gate.tokens().validate(&token).is_ok())
                }));
            }
        }

        for handle in handles {
            let (i, ok) = handle.await.unwrap();
            assert_eq!(ok, sequential[i], "input {}", i);
        }
        assert_eq!(sequential.iter().filter(|ok| **ok).count(), valid.len());
    }

    #[test]
    fn test_threads_share_gate_and_counters() {
        let (gate, _) = fixtures::gate();
        let token = gate.tokens().issue().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let gate = gate.clone();
                let token = token.clone();
                scope.spawn(move || {
                    for _ in 0..10 {
                        let allowed =
                            gate.evaluate(&fixtures::request("/", &[(TOKEN_HEADER, &token)]));
                        assert!(allowed.is_allowed());
                        let rejected = gate.evaluate(&fixtures::request("/", &[]));
                        assert_eq!(
                            rejected,
                            TrustDecision::Rejected(RejectReason::Unauthenticated)
                        );
                    }
                });
            }
        });

        let s = gate.metrics().snapshot();
        assert_eq!(s.allowed_token, 80);
        assert_eq!(s.rejected_unauthenticated, 80);
    }
}
