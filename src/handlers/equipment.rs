// src/handlers/equipment.rs

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
    db::equipment_repo::ItemSearchFilters,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermEquipmentManage, RequirePermission},
    },
    models::equipment::ItemCondition,
    services::equipment_service::{ItemUpdate, NewItemInput},
};

// ---
// Payload: CreateManufacturer / CreateEquipmentType
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateManufacturerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    // Código de 4 dígitos; omitido = próximo livre
    pub code: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentTypePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub code: Option<i64>,
}

// ---
// Handlers: catálogo de fabricantes
// ---

#[utoipa::path(
    post,
    path = "/api/manufacturers",
    tag = "Catalog",
    request_body = CreateManufacturerPayload,
    responses(
        (status = 201, description = "Manufacturer created", body = crate::models::catalog::Manufacturer),
        (status = 409, description = "Code already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_manufacturer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<CreateManufacturerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let manufacturer = app_state
        .equipment_service
        .create_manufacturer(&payload.name, payload.code)
        .await?;

    Ok((StatusCode::CREATED, Json(manufacturer)))
}

#[utoipa::path(
    get,
    path = "/api/manufacturers",
    tag = "Catalog",
    responses(
        (status = 200, description = "All manufacturers", body = [crate::models::catalog::Manufacturer])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_manufacturers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let manufacturers = app_state.equipment_service.list_manufacturers().await?;
    Ok((StatusCode::OK, Json(manufacturers)))
}

#[utoipa::path(
    delete,
    path = "/api/manufacturers/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Manufacturer id")),
    responses(
        (status = 204, description = "Manufacturer removed"),
        (status = 409, description = "Manufacturer still referenced by items")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_manufacturer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.equipment_service.delete_manufacturer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handlers: catálogo de tipos de equipamento
// ---

#[utoipa::path(
    post,
    path = "/api/equipment-types",
    tag = "Catalog",
    request_body = CreateEquipmentTypePayload,
    responses(
        (status = 201, description = "Equipment type created", body = crate::models::catalog::EquipmentType),
        (status = 409, description = "Code already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_equipment_type(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<CreateEquipmentTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let equipment_type = app_state
        .equipment_service
        .create_type(&payload.name, payload.code)
        .await?;

    Ok((StatusCode::CREATED, Json(equipment_type)))
}

#[utoipa::path(
    get,
    path = "/api/equipment-types",
    tag = "Catalog",
    responses(
        (status = 200, description = "All equipment types", body = [crate::models::catalog::EquipmentType])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_equipment_types(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let types = app_state.equipment_service.list_types().await?;
    Ok((StatusCode::OK, Json(types)))
}

#[utoipa::path(
    delete,
    path = "/api/equipment-types/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Equipment type id")),
    responses(
        (status = 204, description = "Equipment type removed"),
        (status = 409, description = "Type still referenced by items")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_equipment_type(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.equipment_service.delete_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub manufacturer_id: i64,
    pub equipment_type_id: i64,
    // Identificador completo; omitido = alocação sequencial
    pub identifier: Option<String>,
    pub size: Option<String>,
    pub condition: Option<ItemCondition>,
    pub location_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub notes: Option<String>,
}

// ---
// Payload: UpdateItem (campos ausentes ficam como estão)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: Option<String>,
    pub size: Option<String>,
    pub condition: Option<ItemCondition>,
    pub condition_note: Option<String>,
    pub location_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub notes: Option<String>,
}

// ---
// Query: busca de itens
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemsQuery {
    // Texto livre sobre título, identificador e notas
    pub q: Option<String>,
    pub manufacturer_id: Option<i64>,
    pub equipment_type_id: Option<i64>,
    pub condition: Option<ItemCondition>,
    pub location_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---
// Handlers: itens de equipamento
// ---

#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "Equipment",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item created with allocated identifier", body = crate::models::equipment::EquipmentItem),
        (status = 400, description = "Malformed identifier or unknown reference"),
        (status = 409, description = "Identifier already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = NewItemInput {
        title: payload.title,
        manufacturer_id: payload.manufacturer_id,
        equipment_type_id: payload.equipment_type_id,
        identifier: payload.identifier,
        size: payload.size,
        condition: payload.condition,
        location_id: payload.location_id,
        metadata: payload.metadata,
        notes: payload.notes,
    };

    let item = app_state
        .equipment_service
        .create_item(&app_state.db_pool, user.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "Equipment",
    params(SearchItemsQuery),
    responses(
        (status = 200, description = "Matching items", body = [crate::models::equipment::EquipmentItem])
    ),
    security(("api_jwt" = []))
)]
pub async fn search_items(
    State(app_state): State<AppState>,
    Query(query): Query<SearchItemsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = ItemSearchFilters {
        text: query.q,
        manufacturer_id: query.manufacturer_id,
        equipment_type_id: query.equipment_type_id,
        condition: query.condition,
        location_id: query.location_id,
        limit: query.limit.unwrap_or(0),
        offset: query.offset.unwrap_or(0),
    };

    let items = app_state.equipment_service.search_items(filters).await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    params(("id" = String, Path, description = "Numeric id or MMMM-TTTT-NNNNN identifier")),
    responses(
        (status = 200, description = "The item", body = crate::models::equipment::EquipmentItem),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;
    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    params(("id" = String, Path, description = "Numeric id or MMMM-TTTT-NNNNN identifier")),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Updated item", body = crate::models::equipment::EquipmentItem),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(reference): Path<String>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state.equipment_service.get_item(&reference).await?;

    let update = ItemUpdate {
        title: payload.title,
        size: payload.size.map(Some),
        condition: payload.condition,
        condition_note: payload.condition_note.map(Some),
        location_id: payload.location_id.map(Some),
        metadata: payload.metadata,
        notes: payload.notes.map(Some),
    };

    let updated = app_state
        .equipment_service
        .update_item(&app_state.db_pool, item.id, user.id, update)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    params(("id" = String, Path, description = "Numeric id or MMMM-TTTT-NNNNN identifier")),
    responses(
        (status = 204, description = "Item, its ledger and its history removed"),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;

    app_state
        .equipment_service
        .delete_item(&app_state.db_pool, item.id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
