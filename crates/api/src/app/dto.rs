use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use rentaldesk_auth::{PublicUser, TOKEN_TTL_SECONDS};
use rentaldesk_properties::{Page, PropertyRecord};

// -------------------------
// Envelope
// -------------------------

/// Uniform response body: `{success, message, data?, code?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            code: Some(code),
        }
    }
}

/// `200` with a data payload.
pub fn ok<T: Serialize>(message: &str, data: T) -> axum::response::Response {
    (StatusCode::OK, Json(Envelope::ok(message, data))).into_response()
}

/// `201` with a data payload.
pub fn created<T: Serialize>(message: &str, data: T) -> axum::response::Response {
    (StatusCode::CREATED, Json(Envelope::ok(message, data))).into_response()
}

/// `200` acknowledgement without data.
pub fn ack(message: &str) -> axum::response::Response {
    let body = Envelope::<()> {
        success: true,
        message: message.to_string(),
        data: None,
        code: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Absent names are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn new(user: PublicUser, access_token: String) -> Self {
        Self {
            user,
            access_token,
            expires_in: TOKEN_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyRecord>,
    pub pagination: Pagination,
}

impl From<Page<PropertyRecord>> for PropertyListResponse {
    fn from(page: Page<PropertyRecord>) -> Self {
        Self {
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
            properties: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
}
