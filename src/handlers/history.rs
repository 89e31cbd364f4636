// src/handlers/history.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    config::AppState,
    db::history_repo::HistoryFilters,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermHistoryClean, RequirePermission},
    },
    models::history::HistoryAction,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub action: Option<HistoryAction>,
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanHistoryPayload {
    pub days_to_keep: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanHistoryOutcome {
    pub deleted: u64,
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}/history",
    tag = "History",
    params(("id" = String, Path, description = "Numeric id or identifier")),
    responses(
        (status = 200, description = "Audit trail for the item, newest first", body = [crate::models::history::HistoryEntryView]),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn item_history(
    State(app_state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;
    let entries = app_state.history_service.item_history(item.id).await?;
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/history",
    tag = "History",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recent audit entries, optionally filtered", body = [crate::models::history::HistoryEntryView])
    ),
    security(("api_jwt" = []))
)]
pub async fn recent_history(
    State(app_state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = HistoryFilters {
        item_id: None,
        action: query.action,
        user_id: query.user_id,
        limit: query.limit.unwrap_or(0),
    };

    let entries = app_state.history_service.recent_history(filters).await?;
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    post,
    path = "/api/history/clean",
    tag = "History",
    request_body = CleanHistoryPayload,
    responses(
        (status = 200, description = "Rows older than the cutoff removed", body = CleanHistoryOutcome),
        (status = 400, description = "days_to_keep below 1")
    ),
    security(("api_jwt" = []))
)]
pub async fn clean_history(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermHistoryClean>,
    Json(payload): Json<CleanHistoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = app_state
        .history_service
        .clean_old_history(payload.days_to_keep)
        .await?;

    tracing::info!(
        "🧹 Limpeza de histórico disparada por {} ({} linhas)",
        user.email,
        deleted
    );

    Ok((StatusCode::OK, Json(CleanHistoryOutcome { deleted })))
}
