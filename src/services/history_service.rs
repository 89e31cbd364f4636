// src/services/history_service.rs

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{history_repo::HistoryFilters, EquipmentRepository, HistoryRepository},
    models::history::HistoryEntryView,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct HistoryService {
    history_repo: HistoryRepository,
    equipment_repo: EquipmentRepository,
    pool: SqlitePool,
}

impl HistoryService {
    pub fn new(
        history_repo: HistoryRepository,
        equipment_repo: EquipmentRepository,
        pool: SqlitePool,
    ) -> Self {
        Self { history_repo, equipment_repo, pool }
    }

    pub async fn item_history(&self, item_id: i64) -> Result<Vec<HistoryEntryView>, AppError> {
        self.equipment_repo
            .find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        self.history_repo.for_item(item_id).await
    }

    // Consulta recente; os filtros opcionais cobrem as visões por
    // usuário e por ação.
    pub async fn recent_history(
        &self,
        mut filters: HistoryFilters,
    ) -> Result<Vec<HistoryEntryView>, AppError> {
        if filters.limit <= 0 {
            filters.limit = DEFAULT_LIMIT;
        }
        filters.limit = filters.limit.min(MAX_LIMIT);
        self.history_repo.recent(&filters).await
    }

    // Retenção irreversível: apaga entradas mais antigas que o corte.
    pub async fn clean_old_history(&self, days_to_keep: i64) -> Result<u64, AppError> {
        if days_to_keep < 1 {
            return Err(AppError::InvalidInput(
                "days_to_keep must be at least 1".to_string(),
            ));
        }
        let cutoff = Utc::now() - Duration::days(days_to_keep);
        let removed = self.history_repo.delete_older_than(cutoff).await?;
        tracing::info!("🧹 Limpeza de histórico: {} entradas removidas", removed);
        Ok(removed)
    }
}
