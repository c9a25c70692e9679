use axum::{routing::get, Router};

pub mod auth;
pub mod properties;
pub mod system;

/// Router for every endpoint; authentication is decided per handler.
///
/// Resource routes are served under `/api` and mirrored at the root.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api", get(system::index))
        .nest("/api", resources())
        .merge(resources())
        .fallback(system::not_found)
}

fn resources() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/properties", properties::router())
}
