pub mod handlers;
pub mod headers;

use anyhow::{Context, Result};
use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::bundle::{ExtensionBundle, EXTENSION_ARCHIVE, EXTENSION_CHECKSUM, EXTENSION_JS};
use crate::k8s::ResourceClient;

pub const EXTENSION_API_PATH: &str = "/v1/extension";
pub const TOUCH_API_PATH: &str = "/v1/touch";

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn ResourceClient>,
    pub bundle: Arc<ExtensionBundle>,
}

impl AppState {
    pub fn new(client: Arc<dyn ResourceClient>, bundle: ExtensionBundle) -> Self {
        Self {
            client,
            bundle: Arc::new(bundle),
        }
    }
}

/// Builds the API router: extension downloads plus the guarded touch endpoint
pub fn build_router(state: AppState, debug: bool) -> Router {
    for (key, resource) in state.bundle.resources() {
        info!(
            resource = %key,
            group = %resource.group,
            version = %resource.version,
            kind = %resource.kind,
            "Registering handler"
        );
    }

    let extension = Router::new()
        .route(&format!("{EXTENSION_API_PATH}/{EXTENSION_ARCHIVE}"), get(handlers::archive_handler))
        .route(&format!("{EXTENSION_API_PATH}/{EXTENSION_JS}"), get(handlers::script_handler))
        .route(&format!("{EXTENSION_API_PATH}/{EXTENSION_CHECKSUM}"), get(handlers::checksum_handler))
        .route(&format!("{EXTENSION_API_PATH}/config"), get(handlers::config_handler))
        .route(&format!("{EXTENSION_API_PATH}/deployment"), get(handlers::deployment_handler))
        .route(&format!("{EXTENSION_API_PATH}/rbac"), get(handlers::rbac_handler));

    // Full paths: the header check matches against the unstripped request path
    let touch = Router::new()
        .route(&format!("{TOUCH_API_PATH}/:key/:namespace/:name"), put(handlers::touch_handler))
        .route_layer(middleware::from_fn(headers::validate_argocd_headers));

    let router = extension.merge(touch).with_state(state);

    if debug {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Serves until SIGINT or SIGTERM
pub async fn run(addr: SocketAddr, state: AppState, debug: bool) -> Result<()> {
    let router = build_router(state, debug);

    info!("Starting server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async { received_or_pending("Ctrl-C", signal::ctrl_c().await).await };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => received_or_pending("SIGTERM", Err(err)).await,
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

/// Completes for a received signal; a handler that failed to install never completes
async fn received_or_pending(signal_name: &str, received: std::io::Result<()>) {
    if let Err(err) = received {
        warn!("Failed to install {} handler: {}", signal_name, err);
        std::future::pending::<()>().await;
    }
}
