// src/handlers/directory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermEquipmentManage, RequirePermission},
    models::directory::TeamMemberRole,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTeamMemberPayload {
    pub user_id: i64,
    pub role: TeamMemberRole,
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "Directory",
    responses(
        (status = 200, description = "All teams", body = [crate::models::directory::Team])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_teams(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let teams = app_state.directory_service.list_teams().await?;
    Ok((StatusCode::OK, Json(teams)))
}

#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "Directory",
    request_body = CreateTeamPayload,
    responses(
        (status = 201, description = "Team created", body = crate::models::directory::Team)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_team(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<CreateTeamPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let team = app_state.directory_service.create_team(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    post,
    path = "/api/teams/{id}/members",
    tag = "Directory",
    params(("id" = i64, Path, description = "Team id")),
    request_body = AddTeamMemberPayload,
    responses(
        (status = 201, description = "Member added to roster", body = crate::models::directory::TeamMember),
        (status = 404, description = "Team or user not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_team_member(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(team_id): Path<i64>,
    Json(payload): Json<AddTeamMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state
        .directory_service
        .add_member(team_id, payload.user_id, payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}
