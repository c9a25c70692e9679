//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the token codec and both in-memory stores
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: response envelope and request/response DTOs
//! - `errors.rs`: error taxonomy mapped onto the envelope

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use rentaldesk_auth::CredentialError;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// Fails only if the demo accounts cannot be hashed.
pub fn build_app(config: &AppConfig) -> Result<Router, CredentialError> {
    let services = Arc::new(services::build_services(config)?);
    Ok(build_app_with(services))
}

/// Build the router around pre-built services (lets tests inspect the stores).
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::trace_requests))
            .layer(axum::middleware::from_fn(middleware::envelope_method_not_allowed))
            .layer(Extension(services)),
    )
}
