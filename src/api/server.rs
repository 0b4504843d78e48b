//! HTTP API server

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_session, LoginService, SessionCodec};
use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::store::{self, CredentialStore};
use crate::upload::{UploadGateway, PUBLIC_PREFIX};

use super::routes;

/// Application state shared across handlers. Everything in it is read-only.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<SessionCodec>,
    pub login: Arc<LoginService>,
    pub uploads: Arc<UploadGateway>,
}

impl AppState {
    /// Wire the components together around an already connected store
    pub fn new(config: &Config, codec: SessionCodec, store: Arc<dyn CredentialStore>) -> Self {
        let codec = Arc::new(codec);
        let login = LoginService::new(store, Arc::clone(&codec), config.auth.session_ttl());

        Self {
            codec,
            login: Arc::new(login),
            uploads: Arc::new(UploadGateway::new(config.uploads.dir.clone())),
        }
    }

    /// Connect the configured store and build state using the system clock
    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.auth.jwt_secret.is_empty() {
            tracing::warn!("JWT secret is not configured; logins will fail until it is set");
        }

        let store = store::connect(&config.store).await?;
        let codec = SessionCodec::new(config.auth.jwt_secret.as_bytes());
        Ok(Self::new(config, codec, store))
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    tokio::fs::create_dir_all(state.uploads.base_dir()).await?;

    let app = create_router(state, &config.server);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let protected = Router::new()
        .route("/admin/upload", post(routes::upload))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(routes::health))
        .route("/admin/login", post(routes::login))
        .route("/admin/verify-session", post(routes::verify_session))
        .merge(protected)
        // Read-only, and ServeDir refuses paths escaping the root
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.base_dir()))
        // Middleware
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
