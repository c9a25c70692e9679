use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::HeaderMap,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{Map, Value};

use rentaldesk_auth::IdentityClaim;
use rentaldesk_core::{DomainError, PropertyId};
use rentaldesk_properties::{NewProperty, PropertyPatch, RawListQuery};

use crate::app::dto::{self, PropertyListResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::gate;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route(
            "/:id",
            get(get_property).put(update_property).delete(delete_property),
        )
}

/// Mutations collapse every gate failure into `INVALID_TOKEN`.
fn caller(services: &AppServices, headers: &HeaderMap) -> Result<IdentityClaim, ApiError> {
    gate::extract_claim(headers, &services.codec).ok_or_else(|| DomainError::Unauthorized.into())
}

fn object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match body? {
        Json(Value::Object(fields)) => Ok(fields),
        Json(_) => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

pub async fn list_properties(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<RawListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(raw) = query?;
    let (filters, paging) = raw.parse()?;

    let page = services.properties.list(&filters, paging);
    Ok(dto::ok("properties loaded", PropertyListResponse::from(page)))
}

pub async fn get_property(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = services.properties.get(&PropertyId::new(id))?;
    Ok(dto::ok("property loaded", record))
}

pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let claim = caller(&services, &headers)?;
    let new = NewProperty::from_json(&object(body)?)?;

    let record = services.properties.create(Some(&claim), new)?;
    Ok(dto::created("property created", record))
}

pub async fn update_property(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let claim = caller(&services, &headers)?;

    // The body is only read once the listing exists and the caller may edit it.
    let record = services
        .properties
        .update_with(Some(&claim), &PropertyId::new(id), Utc::now(), || {
            Ok::<_, ApiError>(PropertyPatch::from_json(&object(body)?)?)
        })?;
    Ok(dto::ok("property updated", record))
}

pub async fn delete_property(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let claim = caller(&services, &headers)?;

    services.properties.delete(Some(&claim), &PropertyId::new(id))?;
    Ok(dto::ack("property deleted"))
}
