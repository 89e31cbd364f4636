// src/models/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Ações auditáveis sobre um item. Gravadas em minúsculas, como chegam
// nos filtros da API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
    AssignmentChanged,
}

// Linha imutável da trilha de auditoria.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub item_id: i64,
    pub action: HistoryAction,
    pub user_id: Option<i64>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// Entrada enriquecida com o nome do ator, para as consultas da API.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: i64,
    pub item_id: i64,
    pub action: HistoryAction,
    pub user_id: Option<i64>,
    pub user_display_name: Option<String>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
