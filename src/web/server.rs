use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::Config;
use crate::error::{Result, TextgraphError};
use crate::extract::Extractor;
use crate::render::Renderer;

/// Uploads larger than this are refused before parsing
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub renderer: Arc<Renderer>,
    pub display_height: u32,
}

/// Interactive web shell: form page, generation endpoints and artifact serving
pub struct ShellServer {
    state: AppState,
    allowed_origins: Vec<String>,
}

impl ShellServer {
    /// Create a new shell server around an extractor and a renderer
    pub fn new(extractor: Arc<dyn Extractor>, renderer: Renderer, config: &Config) -> Self {
        Self {
            state: AppState {
                extractor,
                renderer: Arc::new(renderer),
                display_height: config.http_server.display_height,
            },
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server until it fails
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                TextgraphError::Config(format!(
                    "Port {} is already in use. \
                     Set http_server.port in config.toml to use another port.",
                    port
                ))
            } else {
                TextgraphError::Io(e)
            }
        })?;

        log::info!("Knowledge graph shell listening on http://{}", addr);
        log::info!("Artifacts are written to {}", self.state.renderer.output_dir().display());

        axum::serve(listener, app)
            .await
            .map_err(|e| TextgraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e)
            )))?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        // Empty list: local use, allow any origin
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/", get(routes::index))
            .route("/generate/text", post(routes::generate_from_text))
            .route("/generate/upload", post(routes::generate_from_upload))
            .route("/generate/triples", post(routes::generate_from_triples))
            .route("/artifacts/:id", get(routes::artifact))
            .route("/health", get(routes::health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
                    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )
            .with_state(self.state.clone())
    }
}
