// src/handlers/reports.rs

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{common::error::AppError, config::AppState};

#[utoipa::path(
    get,
    path = "/api/reports/equipment",
    tag = "Reports",
    responses(
        (status = 200, description = "Equipment summary PDF", body = Vec<u8>, content_type = "application/pdf")
    ),
    security(("api_jwt" = []))
)]
pub async fn equipment_report(
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.report_service.equipment_summary_pdf().await?;

    // Configura os headers para o navegador baixar o PDF
    let filename = format!(
        "attachment; filename=\"equipment_summary_{}.pdf\"",
        Utc::now().format("%Y%m%d")
    );
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, filename.as_str()),
    ];

    Ok((headers, pdf_bytes).into_response())
}
