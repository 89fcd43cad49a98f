use crate::config::Config;
use crate::http::{HttpFetch, ReqwestFetcher};
use crate::resolver::Resolver;
use crate::upc::UpcItemDbSource;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_lookup;
pub mod routes_upc;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub resolver: Arc<Resolver>,
    /// Direct UPCitemdb client behind the `/upc` proxy route
    pub upc_proxy: Arc<UpcItemDbSource>,
}

impl AppContext {
    /// Wire the resolver and the `/upc` client to one fetcher.
    pub fn new(config: &Config, fetcher: Arc<dyn HttpFetch>) -> Result<Self> {
        let resolver = Resolver::new(config, fetcher.clone())?;
        let upc_proxy = UpcItemDbSource::new(fetcher, config.upc.upcitemdb_base_url.clone(), None);

        Ok(Self {
            resolver: Arc::new(resolver),
            upc_proxy: Arc::new(upc_proxy),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/health", get(health_check))
        .merge(routes_lookup::lookup_routes())
        .merge(routes_upc::upc_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let fetcher: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new(&config.http));
    let ctx = AppContext::new(&config, fetcher)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
