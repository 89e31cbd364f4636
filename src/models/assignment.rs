// src/models/assignment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- 1. Destinatário de uma atribuição ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssigneeKind {
    Club,
    Team,
    Individual,
}

// Enum fechado no domínio: CLUB resolve para o local de armazenamento
// padrão configurado, TEAM/INDIVIDUAL carregam o id do diretório.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignee {
    Club,
    Team(i64),
    Individual(i64),
}

impl Assignee {
    pub fn kind(&self) -> AssigneeKind {
        match self {
            Assignee::Club => AssigneeKind::Club,
            Assignee::Team(_) => AssigneeKind::Team,
            Assignee::Individual(_) => AssigneeKind::Individual,
        }
    }

    pub fn directory_id(&self) -> Option<i64> {
        match self {
            Assignee::Club => None,
            Assignee::Team(id) | Assignee::Individual(id) => Some(*id),
        }
    }

    // Converte o par (kind, id) vindo da API, rejeitando combinações
    // inválidas antes de tocar no banco.
    pub fn from_parts(kind: AssigneeKind, id: Option<i64>) -> Result<Self, AppError> {
        match (kind, id) {
            (AssigneeKind::Club, None) => Ok(Assignee::Club),
            (AssigneeKind::Club, Some(_)) => Err(AppError::InvalidInput(
                "Assignee ID must be omitted for club assignment".to_string(),
            )),
            (AssigneeKind::Team, Some(id)) => Ok(Assignee::Team(id)),
            (AssigneeKind::Team, None) => Err(AppError::InvalidInput(
                "Assignee ID required for team assignment".to_string(),
            )),
            (AssigneeKind::Individual, Some(id)) => Ok(Assignee::Individual(id)),
            (AssigneeKind::Individual, None) => Err(AppError::InvalidInput(
                "Assignee ID required for individual assignment".to_string(),
            )),
        }
    }
}

// --- 2. Linha do ledger ---
// Append-only: uma atribuição é "fechada" preenchendo unassigned_at,
// nunca apagada (exceto junto com o item).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: i64,
    pub item_id: i64,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: i64,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: i64,
    pub unassigned_at: Option<DateTime<Utc>>,
    pub unassigned_by: Option<i64>,
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
}

// Linha do ledger enriquecida com nomes resolvidos no diretório
// (nome do time, nome de exibição do usuário ou nome do local).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: i64,
    pub item_id: i64,
    pub assignee_kind: AssigneeKind,
    pub assignee_id: i64,
    pub assignee_display: Option<String>,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: i64,
    pub assigned_by_name: Option<String>,
    pub unassigned_at: Option<DateTime<Utc>>,
    pub unassigned_by: Option<i64>,
    pub return_condition: Option<String>,
    pub return_notes: Option<String>,
}

// Resposta de GET /equipment/{id}/assignment: o registro ativo ou o
// sentinela "sem atribuição".
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStatus {
    pub assigned: bool,
    pub assignment: Option<AssignmentView>,
}

// --- 3. Relatório do verificador de conflitos ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTypeEntry {
    pub equipment_type_id: i64,
    pub equipment_type_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamagedItemEntry {
    pub item_id: i64,
    pub identifier: String,
    pub title: String,
    pub condition: crate::models::equipment::ItemCondition,
}

// Severidades independentes: info / warning / error.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub existing_assignments: i64,
    pub duplicate_types: Vec<DuplicateTypeEntry>,
    pub damaged_equipment: Vec<DamagedItemEntry>,
}

impl ConflictReport {
    pub fn has_errors(&self) -> bool {
        !self.damaged_equipment.is_empty()
    }
}

// Pré-validação de atribuição em lote: errors bloqueiam, warnings não.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

// --- 4. Alertas do painel ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    OverdueAssignment,
    NeedsRepair,
    ReportedLost,
    LowStock,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemAlert {
    pub kind: AlertKind,
    pub message: String,
    pub item_id: Option<i64>,
    pub equipment_type_id: Option<i64>,
}
