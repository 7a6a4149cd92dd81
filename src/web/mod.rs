//! Web server and REST API

pub mod api;

pub use api::AppState;

use api::{
    chat_handler, default_message_handler, health_handler, reload_handler, stats_handler,
};
use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use tower_http::cors::CorsLayer;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/default-message", get(default_message_handler))
        .route("/api/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/reload", post(reload_handler))
        // Static chat page
        .route("/", get(index_handler))
        .route("/{*file}", get(static_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve index.html as the chat page
async fn index_handler() -> Response<Body> {
    serve_static_file("index.html")
}

/// Serve static files from embedded assets
async fn static_handler(axum::extract::Path(path): axum::extract::Path<String>) -> Response<Body> {
    serve_static_file(&path)
}

fn serve_static_file(path: &str) -> Response<Body> {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data.to_vec()))
                .unwrap_or_else(|_| Response::new(Body::empty()))
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not Found"))
            .unwrap_or_else(|_| Response::new(Body::empty())),
    }
}
