// src/models/analytics.rs

use serde::Serialize;
use utoipa::ToSchema;

// Confiança da recomendação, por volume bruto de atribuições.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_sample_size(total_assignments: i64) -> Self {
        if total_assignments > 100 {
            ConfidenceLevel::High
        } else if total_assignments > 50 {
            ConfidenceLevel::Medium
        } else if total_assignments > 10 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

// Sugestão de reposição para um tipo de equipamento. Estimativa
// direcional, não previsão estatística.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuantityRecommendation {
    pub equipment_type_id: i64,
    pub equipment_type_name: String,
    pub current_stock: i64,
    pub active_assignments: i64,
    pub estimated_team_size: i64,
    pub base_quantity: f64,
    pub seasonal_multiplier: f64,
    pub recommended_quantity: i64,
    pub confidence_level: ConfidenceLevel,
}
