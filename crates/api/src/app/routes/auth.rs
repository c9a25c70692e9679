use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use rentaldesk_auth::{AuthSession, ProfileUpdate};

use crate::app::dto::{self, AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::gate;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/logout", post(logout))
}

fn sign(services: &AppServices, session: AuthSession) -> Result<AuthResponse, ApiError> {
    let token = services.codec.issue(&session.claim).map_err(ApiError::internal)?;
    Ok(AuthResponse::new(session.user, token))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    let session = services.credentials.login(&body.email, &body.password).inspect_err(|err| {
        tracing::warn!(error = %err, "login rejected");
    })?;

    tracing::info!(user_id = %session.user.id, role = %session.user.role, "login succeeded");
    Ok(dto::ok("login successful", sign(&services, session)?))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    let session = services
        .credentials
        .register(&body.email, &body.password, &body.first_name, &body.last_name)?;

    Ok(dto::created("user registered", sign(&services, session)?))
}

/// Current user, resolved by the email embedded in the token.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let claim = gate::require_claim(&headers, &services.codec)?;

    let user = services
        .credentials
        .find_by_email(&claim.email)
        .ok_or_else(ApiError::user_not_found)?;

    Ok(dto::ok("profile loaded", user))
}

/// Only accounts held by the credential store can be edited; ephemeral demo
/// identities get `USER_NOT_FOUND`.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let claim = gate::require_claim(&headers, &services.codec)?;
    let Json(body) = body?;

    let update = ProfileUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
    };
    let user = services.credentials.update_profile(&claim.email, update)?;

    Ok(dto::ok("profile updated", user))
}

/// Issued tokens stay valid until they expire.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let claim = gate::require_claim(&headers, &services.codec)?;
    let Json(body) = body?;

    services
        .credentials
        .change_password(&claim.email, &body.current_password, &body.new_password)
        .inspect_err(|err| {
            tracing::warn!(user_id = %claim.subject_id, error = %err, "password change rejected");
        })?;

    Ok(dto::ack("password changed"))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Response {
    dto::ack("logout successful")
}
