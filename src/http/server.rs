//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware in a fixed order
//! - Enforce read (request body) and write (response) timeouts
//! - Bind server to listener, shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers::{check_in, check_out, recently, AppState};
use crate::http::middleware::{seal_middleware, SealState, TraceContextLayer};
use crate::observability::Logger;
use crate::store::VisitRecorder;

/// HTTP server for the check-in service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// `logger` is the process base logger; `visits` is the persistence
    /// capability handed to the check-in handler.
    pub fn new(config: ServiceConfig, logger: Logger, visits: Arc<dyn VisitRecorder>) -> Self {
        let router = build_router(&config, logger, AppState::new(visits));
        Self { router }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layers listed later wrap those listed earlier, so the request passes
/// through them bottom-up: HTTP tracing, write timeout, read timeout,
/// trace context, sealing, then the route. The seal layer enforces
/// `limits.max_body_size`; axum's own extractor limit is switched off.
#[allow(deprecated)]
pub fn build_router(config: &ServiceConfig, logger: Logger, state: AppState) -> Router {
    let seal = SealState {
        max_body_size: config.limits.max_body_size,
    };

    Router::new()
        .route("/currents", post(recently))
        .route("/checkin", post(check_in))
        .route("/checkout", post(check_out))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(seal, seal_middleware))
        .layer(TraceContextLayer::new(logger))
        .layer(RequestBodyTimeoutLayer::new(Duration::from_secs(
            config.timeouts.read_secs,
        )))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.write_secs)))
        .layer(TraceLayer::new_for_http())
}
