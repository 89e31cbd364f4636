// src/services/assignment_service.rs

use chrono::Utc;
use serde_json::json;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    db::{
        AssignmentRepository, DirectoryRepository, EquipmentRepository, HistoryRepository,
        UserRepository,
    },
    models::{
        assignment::{Assignee, AssigneeKind, AssignmentRecord, AssignmentStatus, AssignmentView},
        auth::{User, UserRole},
        history::HistoryAction,
    },
};

// Resultado por item de uma operação em lote.
#[derive(Debug)]
pub struct BulkAssignResult {
    pub successful: Vec<i64>,
    pub failed: Vec<(i64, AppError)>,
}

#[derive(Clone)]
pub struct AssignmentService {
    assignment_repo: AssignmentRepository,
    equipment_repo: EquipmentRepository,
    directory_repo: DirectoryRepository,
    user_repo: UserRepository,
    history_repo: HistoryRepository,
    // Destino de atribuições CLUB, resolvido na inicialização a partir
    // da configuração (nunca "o primeiro local do sistema").
    default_storage_location_id: i64,
    pool: SqlitePool,
}

impl AssignmentService {
    pub fn new(
        assignment_repo: AssignmentRepository,
        equipment_repo: EquipmentRepository,
        directory_repo: DirectoryRepository,
        user_repo: UserRepository,
        history_repo: HistoryRepository,
        default_storage_location_id: i64,
        pool: SqlitePool,
    ) -> Self {
        Self {
            assignment_repo,
            equipment_repo,
            directory_repo,
            user_repo,
            history_repo,
            default_storage_location_id,
            pool,
        }
    }

    pub fn default_storage_location_id(&self) -> i64 {
        self.default_storage_location_id
    }

    // --- ASSIGN / TRANSFER ---
    // Fecha a atribuição ativa e abre a nova na mesma transação; a
    // entrada `assignment_changed` carrega o par old/new.
    pub async fn assign<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        assignee: Assignee,
        actor_id: i64,
    ) -> Result<AssignmentRecord, AppError>
    where
        E: sqlx::Executor<'e, Database = Sqlite> + sqlx::Acquire<'e, Database = Sqlite>,
    {
        // 1. Valida item e destinatário antes de abrir a transação
        self.equipment_repo
            .find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        let assignee_id = match assignee {
            Assignee::Club => self.default_storage_location_id,
            Assignee::Team(team_id) => {
                self.directory_repo
                    .find_team(team_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Team not found: {}", team_id)))?;
                team_id
            }
            Assignee::Individual(user_id) => {
                self.user_repo
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))?;
                user_id
            }
        };

        let mut tx = executor.begin().await?;
        let now = Utc::now();

        // 2. Fecha a atribuição ativa (se houver) e abre a nova
        let closed = self
            .assignment_repo
            .close_active(&mut *tx, item_id, actor_id, now, None, None)
            .await?;

        let record = self
            .assignment_repo
            .insert(&mut *tx, item_id, assignee.kind(), assignee_id, actor_id, now)
            .await?;

        // 3. Histórico com o par old/new
        let old = closed
            .as_ref()
            .map(|c| json!({ "kind": c.assignee_kind, "assigneeId": c.assignee_id }))
            .unwrap_or(serde_json::Value::Null);
        self.history_repo
            .insert(
                &mut *tx,
                item_id,
                HistoryAction::AssignmentChanged,
                Some(actor_id),
                &json!({
                    "old": old,
                    "new": { "kind": record.assignee_kind, "assigneeId": record.assignee_id },
                }),
                now,
            )
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    // --- RETURN ---
    // Fecha a atribuição ativa, devolve o item ao armazenamento padrão
    // e registra a mudança.
    pub async fn unassign<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        actor_id: i64,
        return_condition: Option<String>,
        return_notes: Option<String>,
    ) -> Result<AssignmentRecord, AppError>
    where
        E: sqlx::Executor<'e, Database = Sqlite> + sqlx::Acquire<'e, Database = Sqlite>,
    {
        let mut tx = executor.begin().await?;
        let now = Utc::now();

        let closed = self
            .assignment_repo
            .close_active(
                &mut *tx,
                item_id,
                actor_id,
                now,
                return_condition.as_deref(),
                return_notes.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item has no active assignment: {}", item_id))
            })?;

        // Item volta para o local de armazenamento padrão
        let mut item = self
            .equipment_repo
            .find_item_by_id(&mut *tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;
        if item.location_id != Some(self.default_storage_location_id) {
            item.location_id = Some(self.default_storage_location_id);
            self.equipment_repo.update_item(&mut *tx, &item).await?;
        }

        self.history_repo
            .insert(
                &mut *tx,
                item_id,
                HistoryAction::AssignmentChanged,
                Some(actor_id),
                &json!({
                    "old": { "kind": closed.assignee_kind, "assigneeId": closed.assignee_id },
                    "new": serde_json::Value::Null,
                }),
                now,
            )
            .await?;

        tx.commit().await?;
        Ok(closed)
    }

    // --- BULK ---
    // O lote não é atômico entre itens: cada atribuição individual é
    // uma transação própria e as falhas são coletadas por item.
    pub async fn bulk_assign(
        &self,
        item_ids: &[i64],
        assignee: Assignee,
        actor_id: i64,
    ) -> BulkAssignResult {
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for &item_id in item_ids {
            match self.assign(&self.pool, item_id, assignee, actor_id).await {
                Ok(_) => successful.push(item_id),
                Err(err) => failed.push((item_id, err)),
            }
        }
        BulkAssignResult { successful, failed }
    }

    // --- READS ---

    pub async fn active_assignment(&self, item_id: i64) -> Result<AssignmentStatus, AppError> {
        self.equipment_repo
            .find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        let view = self.assignment_repo.active_view_for_item(item_id).await?;
        Ok(AssignmentStatus { assigned: view.is_some(), assignment: view })
    }

    pub async fn assignment_history(&self, item_id: i64) -> Result<Vec<AssignmentView>, AppError> {
        self.equipment_repo
            .find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        self.assignment_repo.history_for_item(item_id).await
    }

    // Quem pode ver um item: administradores e gerentes sempre; itens
    // sem atribuição ou no clube, qualquer autenticado; itens de time,
    // membros do time; itens individuais, o dono ou sua comissão.
    pub async fn user_can_access_item(&self, user: &User, item_id: i64) -> Result<bool, AppError> {
        if matches!(user.role, UserRole::Admin | UserRole::Manager) {
            return Ok(true);
        }

        let active = self.assignment_repo.active_for_item(&self.pool, item_id).await?;
        let Some(active) = active else {
            return Ok(true);
        };

        match active.assignee_kind {
            AssigneeKind::Club => Ok(true),
            AssigneeKind::Team => {
                self.directory_repo.is_member(active.assignee_id, user.id).await
            }
            AssigneeKind::Individual => {
                if active.assignee_id == user.id {
                    return Ok(true);
                }
                self.directory_repo.is_staff_of_user(user.id, active.assignee_id).await
            }
        }
    }
}
