//! API route definitions.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, warn};

use super::handlers;
use super::state::AppState;
use crate::app_config::ServerConfig;
use crate::attachment::MEDIA_URL_PREFIX;

/// Create the application router.
pub fn create_router_with_config(state: AppState, server: &ServerConfig) -> Router {
    let cors = build_cors_layer(&server.cors_origins);
    let max_body_size = server.max_upload_size_mb * 1024 * 1024;

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let media = ServeDir::new(state.chat.media().root());

    Router::new()
        .route("/health", get(handlers::health))
        // Both spellings; clients historically send the trailing slash.
        .route("/chat/", post(handlers::chat))
        .route("/chat", post(handlers::chat))
        .route("/chat-history/", get(handlers::list_history))
        .route("/chat-history", get(handlers::list_history))
        .nest_service(MEDIA_URL_PREFIX, media)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN];

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("CORS: ignoring invalid origin {:?}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if parsed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(headers)
}
