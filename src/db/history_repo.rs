// src/db/history_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::history::{HistoryAction, HistoryEntry, HistoryEntryView},
};

// Filtros de GET /history: todos opcionais, combinados por AND.
#[derive(Debug, Default, Clone)]
pub struct HistoryFilters {
    pub item_id: Option<i64>,
    pub action: Option<HistoryAction>,
    pub user_id: Option<i64>,
    pub limit: i64,
}

#[derive(Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Escrita (sempre dentro da transação do serviço)
    // ---

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        action: HistoryAction,
        user_id: Option<i64>,
        data: &serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let entry = sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO item_history (item_id, action, user_id, data, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(action)
        .bind(user_id)
        .bind(data)
        .bind(created_at)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    // Apaga o log de um item (somente na exclusão do próprio item).
    pub async fn delete_for_item<'e, E>(&self, executor: E, item_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM item_history WHERE item_id = ?")
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // Retenção: remove entradas mais antigas que o corte.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM item_history WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Leitura
    // ---

    pub async fn for_item(&self, item_id: i64) -> Result<Vec<HistoryEntryView>, AppError> {
        let rows = sqlx::query_as::<_, HistoryEntryView>(
            r#"
            SELECT h.id, h.item_id, h.action, h.user_id,
                   u.display_name AS user_display_name, h.data, h.created_at
            FROM item_history h
            LEFT JOIN users u ON u.id = h.user_id
            WHERE h.item_id = ?
            ORDER BY h.created_at DESC, h.id DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Consulta recente com filtros opcionais via guarda de NULL.
    pub async fn recent(&self, filters: &HistoryFilters) -> Result<Vec<HistoryEntryView>, AppError> {
        let rows = sqlx::query_as::<_, HistoryEntryView>(
            r#"
            SELECT h.id, h.item_id, h.action, h.user_id,
                   u.display_name AS user_display_name, h.data, h.created_at
            FROM item_history h
            LEFT JOIN users u ON u.id = h.user_id
            WHERE (?1 IS NULL OR h.item_id = ?1)
              AND (?2 IS NULL OR h.action = ?2)
              AND (?3 IS NULL OR h.user_id = ?3)
            ORDER BY h.created_at DESC, h.id DESC
            LIMIT ?4
            "#,
        )
        .bind(filters.item_id)
        .bind(filters.action)
        .bind(filters.user_id)
        .bind(filters.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_for_item(&self, item_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item_history WHERE item_id = ?")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
