//! HTTP front door for the broker login flow.
//!
//! ## Lifecycle
//!
//! - Bind the listen port (failure is fatal)
//! - Serve until Ctrl-C or SIGTERM
//! - Stop accepting, then drain in-flight requests for at most the grace period
//! - A drain overrun is reported as [`ServerError::ShutdownTimeout`]

pub mod handlers;
pub mod transport;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::client::BrokerClient;
use crate::error::ServerError;
use crate::session::SessionStore;

/// Broker gateway HTTP server.
#[derive(Debug)]
pub struct GatewayServer {
    broker: BrokerClient,
    sessions: SessionStore,
    shutdown_grace: Duration,
}

impl GatewayServer {
    /// Create a new server around an explicitly constructed client and store.
    #[must_use]
    pub fn new(broker: BrokerClient, sessions: SessionStore, shutdown_grace: Duration) -> Self {
        Self {
            broker,
            sessions,
            shutdown_grace,
        }
    }

    /// Build the router serving this gateway's routes.
    #[must_use]
    pub fn router(&self) -> Router {
        transport::create_router(self.broker.clone(), self.sessions.clone())
    }

    /// Session store shared with the handlers.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Bind `0.0.0.0:port` and serve until a process shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the port cannot be bound, and
    /// [`ServerError::ShutdownTimeout`] if draining overruns the grace period.
    pub async fn run(self, port: u16) -> Result<(), ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.run_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ShutdownTimeout`] if in-flight requests are still
    /// running once the grace period after `signal` has elapsed.
    pub async fn run_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = self.shutdown_grace;
        let local_addr = listener.local_addr()?;

        tracing::info!(addr = %local_addr, "HTTP server listening");

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let shutdown = async move {
            signal.await;
            tracing::info!(
                grace = ?grace,
                "Received shutdown signal, draining in-flight requests"
            );
            let _ = signalled_tx.send(());
        };

        let serve = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .into_future();
        tokio::pin!(serve);

        // The drain deadline only starts once the signal has fired.
        tokio::select! {
            result = &mut serve => {
                result?;
                tracing::info!("HTTP server shut down");
                return Ok(());
            }
            _ = signalled_rx => {}
        }

        match tokio::time::timeout(grace, serve).await {
            Ok(result) => {
                result?;
                tracing::info!("Server exited gracefully");
                Ok(())
            }
            Err(_) => {
                tracing::error!(grace = ?grace, "Server forced to shut down");
                Err(ServerError::ShutdownTimeout(grace))
            }
        }
    }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
