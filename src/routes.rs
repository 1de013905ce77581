// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::comments, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the comment routes and the health check.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Comment service).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let comment_routes = Router::new()
        .route(
            "/",
            get(comments::list_root_comments).post(comments::create_comment),
        )
        // Static segment wins over `/{id}`.
        .route("/search", get(comments::search_comments))
        .route(
            "/{id}",
            get(comments::get_comment_with_children).delete(comments::delete_comment),
        );

    Router::new()
        .route("/ping", get(comments::ping))
        .nest("/comments", comment_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
