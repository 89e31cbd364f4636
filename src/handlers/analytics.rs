// src/handlers/analytics.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsQuery {
    // Omitido = todos os tipos com estoque ou histórico
    pub equipment_type_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/analytics/recommendations",
    tag = "Analytics",
    params(RecommendationsQuery),
    responses(
        (status = 200, description = "Reorder suggestions per equipment type", body = [crate::models::analytics::QuantityRecommendation])
    ),
    security(("api_jwt" = []))
)]
pub async fn quantity_recommendations(
    State(app_state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let recommendations = app_state
        .analytics_service
        .quantity_recommendations(query.equipment_type_id)
        .await?;

    Ok((StatusCode::OK, Json(recommendations)))
}
