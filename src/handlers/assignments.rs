// src/handlers/assignments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermEquipmentManage, RequirePermission},
    },
    models::assignment::{Assignee, AssigneeKind},
};

// ---
// Payload: Assign
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub assignee_kind: AssigneeKind,
    // Obrigatório para TEAM/INDIVIDUAL, proibido para CLUB
    pub assignee_id: Option<i64>,
}

// ---
// Query: Unassign (condição/observações de devolução)
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UnassignQuery {
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
}

// ---
// Handlers: atribuição de um item
// ---

#[utoipa::path(
    get,
    path = "/api/equipment/{id}/assignment",
    tag = "Assignments",
    params(("id" = String, Path, description = "Numeric id or identifier")),
    responses(
        (status = 200, description = "Active assignment or unassigned sentinel", body = crate::models::assignment::AssignmentStatus),
        (status = 403, description = "No access to this item"),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_assignment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;

    // Clube e itens livres são visíveis a qualquer autenticado; time
    // exige pertencimento; individual, dono ou comissão do time dele.
    if !app_state
        .assignment_service
        .user_can_access_item(&user, item.id)
        .await?
    {
        return Err(AppError::PermissionDenied(
            "You do not have access to this item's assignment".to_string(),
        ));
    }

    let status = app_state.assignment_service.active_assignment(item.id).await?;
    Ok((StatusCode::OK, Json(status)))
}

#[utoipa::path(
    post,
    path = "/api/equipment/{id}/assignment",
    tag = "Assignments",
    params(("id" = String, Path, description = "Numeric id or identifier")),
    request_body = AssignPayload,
    responses(
        (status = 201, description = "Item assigned (previous holder closed atomically)", body = crate::models::assignment::AssignmentRecord),
        (status = 400, description = "Invalid assignee combination"),
        (status = 404, description = "Item or assignee not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(reference): Path<String>,
    Json(payload): Json<AssignPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignee = Assignee::from_parts(payload.assignee_kind, payload.assignee_id)?;
    let item = app_state.equipment_service.get_item(&reference).await?;

    let record = app_state
        .assignment_service
        .assign(&app_state.db_pool, item.id, assignee, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/api/equipment/{id}/assignment",
    tag = "Assignments",
    params(
        ("id" = String, Path, description = "Numeric id or identifier"),
        UnassignQuery
    ),
    responses(
        (status = 200, description = "Closed assignment record", body = crate::models::assignment::AssignmentRecord),
        (status = 404, description = "Item not found or not assigned")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Path(reference): Path<String>,
    Query(query): Query<UnassignQuery>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;

    let closed = app_state
        .assignment_service
        .unassign(
            &app_state.db_pool,
            item.id,
            user.id,
            query.return_condition,
            query.return_notes,
        )
        .await?;

    Ok((StatusCode::OK, Json(closed)))
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}/assignments",
    tag = "Assignments",
    params(("id" = String, Path, description = "Numeric id or identifier")),
    responses(
        (status = 200, description = "Full ledger for the item, newest first", body = [crate::models::assignment::AssignmentView]),
        (status = 404, description = "Item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn assignment_history(
    State(app_state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.equipment_service.get_item(&reference).await?;
    let history = app_state.assignment_service.assignment_history(item.id).await?;
    Ok((StatusCode::OK, Json(history)))
}

// ---
// Payload: BulkAssign
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignPayload {
    #[validate(length(min = 1, message = "at least one item id is required"))]
    pub item_ids: Vec<i64>,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub item_id: i64,
    pub error: String,
}

// Sucesso parcial por item: o lote não é atômico entre itens, apenas
// cada atribuição individual é.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub operation: String,
    pub successful: Vec<i64>,
    pub failed: Vec<BulkFailure>,
    pub total_processed: usize,
    pub successful_count: usize,
    pub failed_count: usize,
}

#[utoipa::path(
    post,
    path = "/api/equipment/bulk",
    tag = "Assignments",
    request_body = BulkAssignPayload,
    responses(
        (status = 200, description = "Per-item outcome map", body = BulkOutcome),
        (status = 400, description = "Invalid assignee combination")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_assign(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermEquipmentManage>,
    Json(payload): Json<BulkAssignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Pré-condição compartilhada: combinação de destinatário inválida
    // falha o lote inteiro antes de tocar em qualquer item.
    let assignee = Assignee::from_parts(payload.assignee_kind, payload.assignee_id)?;

    let result = app_state
        .assignment_service
        .bulk_assign(&payload.item_ids, assignee, user.id)
        .await;

    let failed: Vec<BulkFailure> = result
        .failed
        .into_iter()
        .map(|(item_id, err)| BulkFailure { item_id, error: err.to_string() })
        .collect();

    let outcome = BulkOutcome {
        operation: "assign".to_string(),
        total_processed: result.successful.len() + failed.len(),
        successful_count: result.successful.len(),
        failed_count: failed.len(),
        successful: result.successful,
        failed,
    };

    Ok((StatusCode::OK, Json(outcome)))
}

// ---
// Query: relatório de conflitos
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ConflictsQuery {
    pub assignee_kind: AssigneeKind,
    pub assignee_id: Option<i64>,
}

// ---
// Payload: pré-validação de atribuição em lote
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAssignmentPayload {
    #[validate(length(min = 1, message = "at least one item id is required"))]
    pub item_ids: Vec<i64>,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/assignments/conflicts",
    tag = "Assignments",
    params(ConflictsQuery),
    responses(
        (status = 200, description = "Conflict report for the assignee", body = crate::models::assignment::ConflictReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn check_conflicts(
    State(app_state): State<AppState>,
    Query(query): Query<ConflictsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let assignee = Assignee::from_parts(query.assignee_kind, query.assignee_id)?;

    let report = app_state
        .conflict_service
        .check_assignment_conflicts(assignee, &[])
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

#[utoipa::path(
    post,
    path = "/api/assignments/validate",
    tag = "Assignments",
    request_body = ValidateAssignmentPayload,
    responses(
        (status = 200, description = "Blocking errors and advisory warnings", body = crate::models::assignment::ValidationReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_assignment(
    State(app_state): State<AppState>,
    Json(payload): Json<ValidateAssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assignee = Assignee::from_parts(payload.assignee_kind, payload.assignee_id)?;

    let report = app_state
        .conflict_service
        .validate_assignment(&payload.item_ids, assignee)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Assignments",
    responses(
        (status = 200, description = "Overdue, repair, lost and low-stock alerts", body = [crate::models::assignment::SystemAlert])
    ),
    security(("api_jwt" = []))
)]
pub async fn system_alerts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state.conflict_service.system_alerts().await?;
    Ok((StatusCode::OK, Json(alerts)))
}
