//! HTTP server startup and shutdown

use std::net::SocketAddr;

use crate::api::build_app;
use crate::core::ServerState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<(), BoxError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let app = build_app(&self.state).with_state(self.state);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "Shop server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Shop server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down...");
}
