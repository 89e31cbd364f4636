// src/services/analytics_service.rs

use chrono::{Datelike, Duration, Utc};

use crate::{
    common::error::AppError,
    db::AnalyticsRepository,
    models::analytics::{ConfidenceLevel, QuantityRecommendation},
};

// Janelas de observação do estimador.
const TEAM_SIZE_WINDOW_DAYS: i64 = 180;
const SEASONAL_WINDOW_DAYS: i64 = 730;

// Fator de folga sobre a demanda base.
const BUFFER_FACTOR: f64 = 1.2;
// Faixa permitida do multiplicador sazonal.
const SEASONAL_MIN: f64 = 0.7;
const SEASONAL_MAX: f64 = 1.5;
// Abaixo desta utilização o estoque atual é considerado excessivo.
const LOW_UTILIZATION: f64 = 0.3;
// Estimativas de elenco quando não há dados: padrão e piso.
const DEFAULT_TEAM_SIZE: i64 = 25;
const MIN_TEAM_SIZE: i64 = 10;

#[derive(Clone)]
pub struct AnalyticsService {
    analytics_repo: AnalyticsRepository,
}

impl AnalyticsService {
    pub fn new(analytics_repo: AnalyticsRepository) -> Self {
        Self { analytics_repo }
    }

    // Sugestão heurística de recompra por tipo (ou de um tipo só).
    // Direcional, não é um modelo de previsão validado.
    pub async fn quantity_recommendations(
        &self,
        type_id: Option<i64>,
    ) -> Result<Vec<QuantityRecommendation>, AppError> {
        let now = Utc::now();

        // 1. Tamanho de elenco estimado (compartilhado entre os tipos)
        let roster = self.analytics_repo.largest_roster().await?;
        let monthly_assignees: Vec<i64> = self
            .analytics_repo
            .monthly_distinct_individual_assignees(now - Duration::days(TEAM_SIZE_WINDOW_DAYS))
            .await?
            .into_iter()
            .map(|r| r.assignees)
            .collect();
        let team_size = estimate_team_size(roster, &monthly_assignees);

        let current_month = format!("{:02}", now.month());
        let stats = self.analytics_repo.type_stats(type_id).await?;

        let mut recommendations = Vec::with_capacity(stats.len());
        for stat in stats {
            // 2. Multiplicador sazonal do tipo
            let buckets = self
                .analytics_repo
                .month_of_year_counts(
                    Some(stat.equipment_type_id),
                    now - Duration::days(SEASONAL_WINDOW_DAYS),
                )
                .await?;
            let current_month_count = buckets
                .iter()
                .find(|b| b.month == current_month)
                .map(|b| b.assignment_count)
                .unwrap_or(0);
            let bucket_counts: Vec<i64> = buckets.iter().map(|b| b.assignment_count).collect();
            let seasonal = seasonal_multiplier(current_month_count, &bucket_counts);

            // 3. Demanda base derivada do uso histórico
            let monthly_per_item =
                stat.total_assignments as f64 / stat.distinct_items_used.max(1) as f64;
            let per_player_yearly = monthly_per_item * 12.0 / team_size.max(1) as f64;
            let base_quantity = per_player_yearly * team_size as f64;

            // 4. Recomendação final com folga e ajuste de piso
            let recommended_quantity = recommend_quantity(
                base_quantity,
                seasonal,
                stat.current_stock,
                stat.active_assignments,
            );

            recommendations.push(QuantityRecommendation {
                equipment_type_id: stat.equipment_type_id,
                equipment_type_name: stat.equipment_type_name,
                current_stock: stat.current_stock,
                active_assignments: stat.active_assignments,
                estimated_team_size: team_size,
                base_quantity,
                seasonal_multiplier: seasonal,
                recommended_quantity,
                confidence_level: ConfidenceLevel::from_sample_size(stat.total_assignments),
            });
        }

        Ok(recommendations)
    }
}

// Elenco estimado: maior elenco cadastrado; sem elenco, média mensal
// de destinatários individuais distintos; sem dados, o padrão. Nunca
// abaixo do piso.
fn estimate_team_size(roster: i64, monthly_assignees: &[i64]) -> i64 {
    let estimated = if roster > 0 {
        roster
    } else if monthly_assignees.is_empty() {
        DEFAULT_TEAM_SIZE
    } else {
        let sum: i64 = monthly_assignees.iter().sum();
        (sum as f64 / monthly_assignees.len() as f64).round() as i64
    };
    estimated.max(MIN_TEAM_SIZE)
}

// Mês atual ÷ média dos meses com movimento, limitado à faixa
// [SEASONAL_MIN, SEASONAL_MAX]. Sem movimento algum, neutro (1.0).
fn seasonal_multiplier(current_month_count: i64, bucket_counts: &[i64]) -> f64 {
    let nonzero: Vec<i64> = bucket_counts.iter().copied().filter(|&c| c > 0).collect();
    if nonzero.is_empty() {
        return 1.0;
    }
    let avg = nonzero.iter().sum::<i64>() as f64 / nonzero.len() as f64;
    if avg == 0.0 {
        return 1.0;
    }
    (current_month_count as f64 / avg).clamp(SEASONAL_MIN, SEASONAL_MAX)
}

// round(base × folga × sazonal); nunca recomenda menos que o estoque
// atual, exceto sob utilização baixa, quando sugere reduzir 10%.
fn recommend_quantity(base: f64, seasonal: f64, current_stock: i64, active: i64) -> i64 {
    let recommended = (base * BUFFER_FACTOR * seasonal).round() as i64;
    if recommended >= current_stock {
        return recommended;
    }

    let utilization = if current_stock > 0 {
        active as f64 / current_stock as f64
    } else {
        0.0
    };
    if utilization < LOW_UTILIZATION {
        (current_stock as f64 * 0.9).round() as i64
    } else {
        current_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_size_prefers_roster_then_assignees_then_default() {
        assert_eq!(estimate_team_size(40, &[]), 40);
        assert_eq!(estimate_team_size(0, &[20, 30]), 25);
        assert_eq!(estimate_team_size(0, &[]), DEFAULT_TEAM_SIZE);
        // Piso aplicado a estimativas minúsculas
        assert_eq!(estimate_team_size(3, &[]), MIN_TEAM_SIZE);
        assert_eq!(estimate_team_size(0, &[1, 2]), MIN_TEAM_SIZE);
    }

    #[test]
    fn seasonal_multiplier_is_clamped() {
        // 30 contra média 10 → 3.0, limitado a 1.5
        assert_eq!(seasonal_multiplier(30, &[10, 10, 10, 30]), 1.5);
        // 1 contra média 15 → 0.07, limitado a 0.7
        assert_eq!(seasonal_multiplier(1, &[10, 20]), 0.7);
        // Sem histórico: neutro
        assert_eq!(seasonal_multiplier(0, &[]), 1.0);
        assert_eq!(seasonal_multiplier(0, &[0, 0]), 1.0);
    }

    #[test]
    fn recommendation_never_undercuts_well_used_stock() {
        // Base pediria 6, mas 10 em estoque com 8 ativos (80% de uso)
        assert_eq!(recommend_quantity(5.0, 1.0, 10, 8), 10);
    }

    #[test]
    fn low_utilization_suggests_ten_percent_reduction() {
        // 10 em estoque, 1 ativo (10% de uso) → sugere 9
        assert_eq!(recommend_quantity(2.0, 1.0, 10, 1), 9);
    }

    #[test]
    fn zero_history_yields_zero_for_empty_stock() {
        assert_eq!(recommend_quantity(0.0, 1.0, 0, 0), 0);
    }
}
