// src/db/analytics_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::common::error::AppError;

// Estatísticas de estoque e uso por tipo de equipamento.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TypeStatRow {
    pub equipment_type_id: i64,
    pub equipment_type_name: String,
    pub current_stock: i64,
    pub active_assignments: i64,
    pub total_assignments: i64,
    pub distinct_items_used: i64,
}

// Destinatários individuais distintos por mês-calendário ("2026-03").
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyAssigneesRow {
    pub month: String,
    pub assignees: i64,
}

// Atribuições por mês do ano ("01".."12"), agregadas entre anos.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthOfYearRow {
    pub month: String,
    pub assignment_count: i64,
}

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn type_stats(&self, type_id: Option<i64>) -> Result<Vec<TypeStatRow>, AppError> {
        let rows = sqlx::query_as::<_, TypeStatRow>(
            r#"
            SELECT t.id AS equipment_type_id, t.name AS equipment_type_name,
                   COUNT(DISTINCT i.id) AS current_stock,
                   COUNT(CASE WHEN a.unassigned_at IS NULL THEN a.id END) AS active_assignments,
                   COUNT(a.id) AS total_assignments,
                   COUNT(DISTINCT a.item_id) AS distinct_items_used
            FROM equipment_types t
            LEFT JOIN equipment_items i ON i.equipment_type_id = t.id
            LEFT JOIN assignments a ON a.item_id = i.id
            WHERE (?1 IS NULL OR t.id = ?1)
            GROUP BY t.id, t.name
            ORDER BY t.name ASC
            "#,
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Proxy de tamanho de elenco quando nenhum time tem jogadores:
    // média mensal de indivíduos distintos que receberam equipamento.
    pub async fn monthly_distinct_individual_assignees(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthlyAssigneesRow>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyAssigneesRow>(
            r#"
            SELECT strftime('%Y-%m', assigned_at) AS month,
                   COUNT(DISTINCT assignee_id) AS assignees
            FROM assignments
            WHERE assignee_kind = 'INDIVIDUAL' AND assigned_at >= ?
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Base do multiplicador sazonal: volume de atribuições por mês do
    // ano, somado entre os anos da janela.
    pub async fn month_of_year_counts(
        &self,
        type_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthOfYearRow>, AppError> {
        let rows = sqlx::query_as::<_, MonthOfYearRow>(
            r#"
            SELECT strftime('%m', a.assigned_at) AS month,
                   COUNT(*) AS assignment_count
            FROM assignments a
            JOIN equipment_items i ON i.id = a.item_id
            WHERE (?1 IS NULL OR i.equipment_type_id = ?1) AND a.assigned_at >= ?2
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .bind(type_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Maior elenco ativo entre os times (jogadores apenas).
    pub async fn largest_roster(&self) -> Result<i64, AppError> {
        let largest: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) AS players
            FROM team_members
            WHERE role = 'PLAYER'
            GROUP BY team_id
            ORDER BY players DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(largest.unwrap_or(0))
    }
}
