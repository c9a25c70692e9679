use axum::{http::Uri, response::Response};
use chrono::Utc;
use serde_json::json;

use crate::app::dto::{self, HealthResponse};
use crate::app::errors::ApiError;

pub async fn health() -> Response {
    dto::ok(
        "service is healthy",
        HealthResponse {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Machine-readable index of the public endpoints.
pub async fn index() -> Response {
    dto::ok(
        "RentalDesk API",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "health": "/health",
            "endpoints": {
                "auth": {
                    "login": "POST /api/auth/login",
                    "register": "POST /api/auth/register",
                    "profile": "GET /api/auth/profile",
                    "updateProfile": "PUT /api/auth/profile",
                    "changePassword": "POST /api/auth/change-password",
                    "logout": "POST /api/auth/logout",
                },
                "properties": {
                    "list": "GET /api/properties",
                    "get": "GET /api/properties/{id}",
                    "create": "POST /api/properties",
                    "update": "PUT /api/properties/{id}",
                    "delete": "DELETE /api/properties/{id}",
                },
            },
        }),
    )
}

pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "no route");
    ApiError::not_found()
}
