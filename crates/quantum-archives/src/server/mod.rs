//! Front-ends over a running session.
//!
//! Provides an interactive terminal shell and a JSON-over-HTTP API with a
//! server-sent-events snapshot stream. Both only translate user input into
//! session intents and render the snapshots they get back.

pub mod http;
pub mod shell;

use std::net::SocketAddr;

use crate::session::SessionHandle;

/// Front-end runner for one session.
#[derive(Debug, Clone)]
pub struct ArchiveServer {
    session: SessionHandle,
}

impl ArchiveServer {
    /// Create a server over a running session.
    #[must_use]
    pub const fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Run the interactive shell on stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_shell(self) -> anyhow::Result<()> {
        tracing::info!("Starting Quantum Archives shell");

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        shell::run_shell(stdin, stdout, self.session).await
    }

    /// Run the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        tracing::info!("Starting Quantum Archives HTTP API on port {}", port);

        let router = http::create_router(self.session);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// The session this server drives.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
