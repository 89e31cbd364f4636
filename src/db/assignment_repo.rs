// src/db/assignment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::{
        assignment::{AssigneeKind, AssignmentRecord, AssignmentView},
        equipment::ItemCondition,
    },
};

// Item ativamente atribuído a um destinatário, com os campos que o
// verificador de conflitos analisa.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveItemRow {
    pub item_id: i64,
    pub identifier: String,
    pub title: String,
    pub equipment_type_id: i64,
    pub type_name: String,
    pub condition: ItemCondition,
}

// Atribuição ativa há mais tempo que o corte (alerta de atraso).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OverdueRow {
    pub item_id: i64,
    pub identifier: String,
    pub title: String,
    pub assigned_at: DateTime<Utc>,
}

// Tipo com menos unidades livres que o mínimo (alerta de estoque).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockRow {
    pub equipment_type_id: i64,
    pub type_name: String,
    pub unassigned_count: i64,
}

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: SqlitePool,
}

impl AssignmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Escrita (sempre dentro da transação do serviço)
    // ---

    // Fecha a atribuição ativa do item, se existir, e devolve a linha
    // fechada (no máximo uma, garantido pelo índice parcial).
    pub async fn close_active<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        unassigned_by: i64,
        unassigned_at: DateTime<Utc>,
        return_condition: Option<&str>,
        return_notes: Option<&str>,
    ) -> Result<Option<AssignmentRecord>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let closed = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            UPDATE assignments
            SET unassigned_at = ?, unassigned_by = ?, return_condition = ?, return_notes = ?
            WHERE item_id = ? AND unassigned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(unassigned_at)
        .bind(unassigned_by)
        .bind(return_condition)
        .bind(return_notes)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;
        Ok(closed)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        kind: AssigneeKind,
        assignee_id: i64,
        assigned_by: i64,
        assigned_at: DateTime<Utc>,
    ) -> Result<AssignmentRecord, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, AssignmentRecord>(
            r#"
            INSERT INTO assignments (item_id, assignee_kind, assignee_id, assigned_at, assigned_by)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(kind)
        .bind(assignee_id)
        .bind(assigned_at)
        .bind(assigned_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(
                        "Item already has an active assignment".to_string(),
                    );
                }
            }
            AppError::DatabaseError(e)
        })
    }

    // Apaga o ledger de um item (somente na exclusão do próprio item).
    pub async fn delete_for_item<'e, E>(&self, executor: E, item_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM assignments WHERE item_id = ?")
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Leitura
    // ---

    // Ordenação defensiva: se o invariante de linha única falhar, vence
    // a atribuição mais recente.
    pub async fn active_for_item<'e, E>(
        &self,
        executor: E,
        item_id: i64,
    ) -> Result<Option<AssignmentRecord>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT * FROM assignments
            WHERE item_id = ? AND unassigned_at IS NULL
            ORDER BY assigned_at DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn active_view_for_item(&self, item_id: i64) -> Result<Option<AssignmentView>, AppError> {
        let row = sqlx::query_as::<_, AssignmentView>(&view_query(
            "WHERE a.item_id = ? AND a.unassigned_at IS NULL ORDER BY a.assigned_at DESC LIMIT 1",
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn history_for_item(&self, item_id: i64) -> Result<Vec<AssignmentView>, AppError> {
        let rows = sqlx::query_as::<_, AssignmentView>(&view_query(
            "WHERE a.item_id = ? ORDER BY a.assigned_at DESC",
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Itens ativos nas mãos de um destinatário, com tipo e condição.
    pub async fn active_items_for_assignee(
        &self,
        kind: AssigneeKind,
        assignee_id: i64,
    ) -> Result<Vec<ActiveItemRow>, AppError> {
        let rows = sqlx::query_as::<_, ActiveItemRow>(
            r#"
            SELECT i.id AS item_id, i.identifier, i.title,
                   i.equipment_type_id, t.name AS type_name, i.condition
            FROM assignments a
            JOIN equipment_items i ON i.id = a.item_id
            JOIN equipment_types t ON t.id = i.equipment_type_id
            WHERE a.assignee_kind = ? AND a.assignee_id = ? AND a.unassigned_at IS NULL
            ORDER BY i.identifier ASC
            "#,
        )
        .bind(kind)
        .bind(assignee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---
    // Consultas dos alertas
    // ---

    pub async fn overdue_active(&self, cutoff: DateTime<Utc>) -> Result<Vec<OverdueRow>, AppError> {
        let rows = sqlx::query_as::<_, OverdueRow>(
            r#"
            SELECT i.id AS item_id, i.identifier, i.title, a.assigned_at
            FROM assignments a
            JOIN equipment_items i ON i.id = a.item_id
            WHERE a.unassigned_at IS NULL AND a.assigned_at < ?
            ORDER BY a.assigned_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn items_in_condition(&self, condition: ItemCondition) -> Result<Vec<ActiveItemRow>, AppError> {
        let rows = sqlx::query_as::<_, ActiveItemRow>(
            r#"
            SELECT i.id AS item_id, i.identifier, i.title,
                   i.equipment_type_id, t.name AS type_name, i.condition
            FROM equipment_items i
            JOIN equipment_types t ON t.id = i.equipment_type_id
            WHERE i.condition = ?
            ORDER BY i.identifier ASC
            "#,
        )
        .bind(condition)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Tipos com menos de `minimum` unidades sem atribuição ativa.
    pub async fn low_stock_types(&self, minimum: i64) -> Result<Vec<LowStockRow>, AppError> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT t.id AS equipment_type_id, t.name AS type_name,
                   COUNT(i.id) - COUNT(a.id) AS unassigned_count
            FROM equipment_types t
            LEFT JOIN equipment_items i ON i.equipment_type_id = t.id
            LEFT JOIN assignments a ON a.item_id = i.id AND a.unassigned_at IS NULL
            GROUP BY t.id, t.name
            HAVING COUNT(i.id) - COUNT(a.id) < ?
            ORDER BY t.name ASC
            "#,
        )
        .bind(minimum)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// Monta a consulta enriquecida com nomes: local para CLUB, time para
// TEAM, usuário para INDIVIDUAL.
fn view_query(tail: &str) -> String {
    format!(
        r#"
        SELECT a.id, a.item_id, a.assignee_kind, a.assignee_id,
               CASE a.assignee_kind
                   WHEN 'CLUB' THEN loc.name
                   WHEN 'TEAM' THEN tm.name
                   WHEN 'INDIVIDUAL' THEN u.display_name
               END AS assignee_display,
               a.assigned_at, a.assigned_by, ab.display_name AS assigned_by_name,
               a.unassigned_at, a.unassigned_by, a.return_condition, a.return_notes
        FROM assignments a
        LEFT JOIN locations loc ON a.assignee_kind = 'CLUB' AND loc.id = a.assignee_id
        LEFT JOIN teams tm ON a.assignee_kind = 'TEAM' AND tm.id = a.assignee_id
        LEFT JOIN users u ON a.assignee_kind = 'INDIVIDUAL' AND u.id = a.assignee_id
        LEFT JOIN users ab ON ab.id = a.assigned_by
        {}
        "#,
        tail
    )
}
