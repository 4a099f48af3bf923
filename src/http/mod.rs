//! HTTP boundary over the ingestion and answering pipeline.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::config::ServerConfig;
use crate::context::AppContext;

pub use error::ApiError;
pub use handlers::{AppState, AskRequest, AskResponse, SuggestedQuestions};

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let server = &ctx.settings.server;
    let cors = cors_layer(server);
    let body_limit = DefaultBodyLimit::max(server.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/upload", post(handlers::upload))
        .route("/upload/", post(handlers::upload))
        .route("/ask", post(handlers::ask))
        .route("/ask/", post(handlers::ask))
        .route("/documents", get(handlers::list_documents))
        .route("/documents/", get(handlers::list_documents))
        .route(
            "/documents/{id}",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .route(
            "/documents/{id}/suggested-questions",
            get(handlers::suggested_questions),
        )
        .layer(ServiceBuilder::new().layer(cors).layer(body_limit))
        .with_state(ctx)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(target: "http", "ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    // Credentials cannot be combined with wildcards, so methods and
    // headers are mirrored from the request instead
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Serve until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, bind: &str) -> anyhow::Result<()> {
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    crate::log_event!("http", "listening", "http://{bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    crate::log_event!("http", "stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => crate::log_event!("http", "shutdown", "received Ctrl-C"),
        Err(e) => {
            tracing::error!(target: "http", "failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
