// src/handlers/locations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermEquipmentManage, RequirePermission},
    models::location::LocationKind,
};

// ---
// Payload: CreateLocation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub parent_id: Option<i64>,
    // Omitido = STORAGE
    pub kind: Option<LocationKind>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub capacity: Option<i64>,
}

// ---
// Payload: UpdateLocation (campos ausentes ficam como estão)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationPayload {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub parent_id: Option<i64>,
    pub kind: Option<LocationKind>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub capacity: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListLocationsQuery {
    // Por padrão só locais ativos são listados
    pub include_inactive: Option<bool>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    params(ListLocationsQuery),
    responses(
        (status = 200, description = "Storage locations", body = [crate::models::location::Location])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state
        .location_service
        .list_locations(query.include_inactive.unwrap_or(false))
        .await?;
    Ok((StatusCode::OK, Json(locations)))
}

#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Locations",
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Location created with unique slug", body = crate::models::location::Location),
        (status = 404, description = "Parent location not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .location_service
        .create_location(
            &payload.name,
            payload.parent_id,
            payload.kind.unwrap_or(LocationKind::Storage),
            payload.address,
            payload.contact,
            payload.capacity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    tag = "Locations",
    params(("id" = i64, Path, description = "Location id")),
    request_body = UpdateLocationPayload,
    responses(
        (status = 200, description = "Updated location", body = crate::models::location::Location),
        (status = 400, description = "Location cannot be its own parent"),
        (status = 404, description = "Location not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_location(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .location_service
        .update_location(
            id,
            payload.name,
            payload.parent_id.map(Some),
            payload.kind,
            payload.address.map(Some),
            payload.contact.map(Some),
            payload.capacity.map(Some),
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(location)))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    tag = "Locations",
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 204, description = "Location removed"),
        (status = 409, description = "Location has children or items")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_location(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.location_service.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
