use crate::config::Config;
use crate::metadata::{MetadataProvider, OmdbProvider};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use cinelog_db::{pool, DataManager, SqliteDataManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod routes_movies;
pub mod routes_users;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    /// Persistent storage for users, movies and ratings
    pub data: Arc<dyn DataManager>,
    /// Where new movies are looked up by title
    pub metadata: Arc<dyn MetadataProvider>,
}

impl AppContext {
    pub fn new(data: Arc<dyn DataManager>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { data, metadata }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn api_routes() -> Router<AppContext> {
    routes_movies::movie_routes().merge(routes_users::user_routes())
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Build the context a running server uses: a SQLite-backed data manager
/// and the OMDb provider.
pub fn build_context(config: &Config) -> Result<AppContext> {
    let db_path = config.server.database_path(None).to_string_lossy().into_owned();
    let db_pool = pool::init_pool(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    tracing::info!("Using database {}", db_path);

    let provider = OmdbProvider::new(&config.omdb);
    if !provider.is_available() {
        tracing::warn!("No OMDb API key available; movie lookups will be rejected");
    }

    Ok(AppContext::new(
        Arc::new(SqliteDataManager::new(db_pool)),
        Arc::new(provider),
    ))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = build_context(&config)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
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
