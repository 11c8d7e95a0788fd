use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use log::{info, warn};
use std::convert::Infallible;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::Service;

use crate::auth::CredentialStore;
use crate::config::ServerConfig;
use crate::error::AtlasError;
use crate::middleware::{
    AuthGate, QuotaPolicy, auth_gate, content_type_hint, log_requests, quota_reporter,
};
use crate::protocol::DavEngine;

/// Shared state handed to the middleware layers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub quota: Arc<QuotaPolicy>,
}

impl AppState {
    pub fn new(store: Arc<CredentialStore>, quota: QuotaPolicy, realm: &str) -> Self {
        Self {
            auth: AuthGate::new(store, realm),
            quota: Arc::new(quota),
        }
    }
}

/// Composes the pipeline: request log, auth gate, content-type hint and quota
/// reporter, in that order, in front of `engine`.
pub fn build_router<E>(state: AppState, engine: E) -> Router
where
    E: Service<Request<Body>, Error = Infallible> + Clone + Send + Sync + 'static,
    E::Response: IntoResponse,
    E::Future: Send + 'static,
{
    // Layers wrap outwards: the last one added sees the request first.
    Router::new()
        .fallback_service(engine)
        .layer(from_fn_with_state(state.quota, quota_reporter))
        .layer(from_fn(content_type_hint))
        .layer(from_fn_with_state(state.auth, auth_gate))
        .layer(from_fn(log_requests))
}

pub struct Server {
    config: ServerConfig,
    store: Arc<CredentialStore>,
}

impl Server {
    pub fn new(config: ServerConfig, store: Arc<CredentialStore>) -> Self {
        Self { config, store }
    }

    /// The production router over the configured data root.
    pub fn router(&self) -> Router {
        let data_root = self.config.data_root();
        let quota = QuotaPolicy::new(&data_root, self.config.quota_bytes());
        let state = AppState::new(Arc::clone(&self.store), quota, &self.config.realm);
        build_router(state, DavEngine::new(&data_root))
    }

    /// Serves until Ctrl-C or SIGTERM, then drains in-flight requests for at
    /// most [`SHUTDOWN_GRACE`].
    pub async fn start(&self) -> Result<(), AtlasError> {
        let data_root = self.config.data_root();
        std::fs::create_dir_all(&data_root)?;

        if self.store.is_empty() {
            warn!(
                "No users defined. Server will reject all connections. Use 'atlas user add' to create a user."
            );
        }

        let quota = self.config.quota_bytes();
        if quota > 0 {
            info!(
                "Quota: {} bytes ({:.2} GiB) reported to clients",
                quota,
                quota as f64 / (1u64 << 30) as f64
            );
        }

        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Atlas Server starting on {} serving {}", addr, data_root.display());

        serve_until(listener, self.router(), shutdown_signal(), SHUTDOWN_GRACE).await?;

        info!("Server stopped gracefully");
        Ok(())
    }
}

/// Time in-flight requests get to finish once shutdown starts
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serves `router` until `signal` resolves, then waits at most `grace` for
/// in-flight requests before giving up on them.
pub async fn serve_until<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    grace: Duration,
) -> Result<(), AtlasError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let stopping = Arc::new(Notify::new());
    let notify = Arc::clone(&stopping);
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            notify.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return Ok(result?),
        _ = stopping.notified() => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!("Requests still running after {:?}, stopping anyway", grace);
            Err(AtlasError::ShutdownTimeout(grace))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutting down server...");
}
