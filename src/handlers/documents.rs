// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermDocumentsManage, RequirePermission},
    models::document::{DocumentCategory, ScrapeTrigger},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub category: Option<DocumentCategory>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListRunsQuery {
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Downloaded federation documents", body = [crate::models::document::Document])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.scraper_service.list_documents(query.category).await?;
    Ok((StatusCode::OK, Json(documents)))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document record", body = crate::models::document::Document),
        (status = 404, description = "Document not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let document = app_state.scraper_service.get_document(id).await?;
    Ok((StatusCode::OK, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents/runs",
    tag = "Documents",
    params(ListRunsQuery),
    responses(
        (status = 200, description = "Most recent scrape runs", body = [crate::models::document::ScrapeRun])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_runs(
    State(app_state): State<AppState>,
    Query(query): Query<ListRunsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let runs = app_state
        .scraper_service
        .list_runs(query.limit.unwrap_or(0))
        .await?;
    Ok((StatusCode::OK, Json(runs)))
}

#[utoipa::path(
    post,
    path = "/api/documents/scrape",
    tag = "Documents",
    responses(
        (status = 200, description = "Finished run with per-document counts", body = crate::models::document::ScrapeRun),
        (status = 502, description = "Source page could not be fetched")
    ),
    security(("api_jwt" = []))
)]
pub async fn trigger_scrape(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermDocumentsManage>,
) -> Result<impl IntoResponse, AppError> {
    let run = app_state
        .scraper_service
        .run_scrape(ScrapeTrigger::Manual)
        .await?;

    Ok((StatusCode::OK, Json(run)))
}
