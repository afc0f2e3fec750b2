//! HTTP server lifecycle — bind → spawn → return a handle with a
//! shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::api::router::build_router;
use crate::state::AppState;

/// Metadata for a running server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSession {
    pub session_id: Uuid,
    pub local_addr: SocketAddr,
    pub started_at: chrono::NaiveDateTime,
}

/// Handle to a running server.
pub struct ServerHandle {
    pub session: ServerSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Signal graceful shutdown. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }

    /// Wait for the serving task to finish.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Bind the listener and spawn the axum server in a background task.
///
/// Binding failures are startup errors and propagate; once serving, the
/// task only ends via the shutdown channel.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<ServerHandle, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read bound address: {e}"))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = build_router(state);

    let join = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;

        if let Err(e) = result {
            tracing::error!(error = %e, "Server exited with error");
        }
    });

    let session = ServerSession {
        session_id: Uuid::new_v4(),
        local_addr,
        started_at: chrono::Local::now().naive_local(),
    };

    tracing::info!(addr = %local_addr, "HTTP server listening");

    Ok(ServerHandle {
        session,
        shutdown_tx: Some(shutdown_tx),
        join,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::TextArbiter;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            ProductCatalog::empty(),
            TextArbiter::new(Box::new(MockOcrEngine::empty())),
            None,
            None,
            5,
        ))
    }

    #[tokio::test]
    async fn serve_binds_ephemeral_port_and_shuts_down() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut handle = serve(test_state(), addr).await.unwrap();

        assert_ne!(handle.session.local_addr.port(), 0);

        handle.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle.join())
            .await
            .expect("server did not shut down in time");
    }

    #[tokio::test]
    async fn served_routes_answer_over_tcp() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut handle = serve(test_state(), addr).await.unwrap();
        let port = handle.session.local_addr.port();

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
        assert!(response.contains("Shopsense"));

        handle.shutdown();
        handle.join().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut handle = serve(test_state(), addr).await.unwrap();
        handle.shutdown();
        handle.shutdown();
        handle.join().await;
    }
}
