// src/models/equipment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- 1. Condição física do item ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    Normal,
    NeedsRepair,
    Repaired,
    ReportedLost,
    Scrapped,
}

impl ItemCondition {
    // Condições que impedem uma nova atribuição (checadas pelo
    // validador de conflitos).
    pub fn is_damaged(&self) -> bool {
        matches!(self, ItemCondition::NeedsRepair | ItemCondition::ReportedLost)
    }
}

// --- 2. Item de equipamento ---
// O identificador MMMM-TTTT-NNNNN é imutável e único; `serial_no` é o
// segmento NNNNN já decomposto, único por par (fabricante, tipo).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub id: i64,
    pub identifier: String,
    pub title: String,
    pub manufacturer_id: i64,
    pub equipment_type_id: i64,
    pub serial_no: i64,
    pub size: Option<String>,
    pub condition: ItemCondition,
    pub condition_note: Option<String>,
    pub condition_changed_at: Option<DateTime<Utc>>,
    pub location_id: Option<i64>,
    // Metadados livres (chave-valor), persistidos como TEXT JSON
    pub metadata: serde_json::Value,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
