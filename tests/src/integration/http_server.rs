//! # Live Server
//!
//! Runs [`InternalService`] on a real socket and talks raw HTTP/1.1 to it.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Send a GET with `headers` and return the raw response text.
pub async fn raw_get(
    addr: std::net::SocketAddr,
    path: &str,
    headers: &[(&str, &str)],
) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    let mut request = format!("GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n", path, addr);
    for (name, value) in headers {
        request.push_str(&format!("{}: {}\r\n", name, value));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, TOKEN_HEADER};
    use nest_service_auth::InternalService;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_live_server_enforces_trust() {
        let (gate, _) = fixtures::gate();
        let token = gate.tokens().issue().unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let service = InternalService::new(gate, addr);
        let server = tokio::spawn(service.serve_on(listener, async {
            let _ = stop_rx.await;
        }));

        let health = raw_get(addr, "/health", &[]).await.unwrap();
        assert!(health.starts_with("HTTP/1.1 200"), "{}", health);

        let denied = raw_get(addr, "/internal/ping", &[]).await.unwrap();
        assert!(denied.starts_with("HTTP/1.1 401"), "{}", denied);
        assert!(denied.to_ascii_lowercase().contains("www-authenticate"));

        let allowed = raw_get(addr, "/internal/ping", &[(TOKEN_HEADER, &token)])
            .await
            .unwrap();
        assert!(allowed.starts_with("HTTP/1.1 200"), "{}", allowed);
        assert!(allowed.contains("pong"));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
