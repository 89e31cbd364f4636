// src/services/equipment_service.rs

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde_json::json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    db::{
        equipment_repo::{ItemSearchFilters, NewItem},
        AssignmentRepository, EquipmentRepository, HistoryRepository, LocationRepository,
    },
    models::{
        catalog::{EquipmentType, Manufacturer},
        equipment::{EquipmentItem, ItemCondition},
        history::HistoryAction,
    },
};

// Formato composto MMMM-TTTT-NNNNN: código do fabricante, código do
// tipo e sequencial por par, todos com zero à esquerda.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{4})-(\d{5})$").expect("regex de identificador"));

pub fn format_identifier(manufacturer_code: i64, type_code: i64, serial: i64) -> String {
    format!("{:04}-{:04}-{:05}", manufacturer_code, type_code, serial)
}

pub fn parse_identifier(identifier: &str) -> Option<(i64, i64, i64)> {
    let caps = IDENTIFIER_RE.captures(identifier)?;
    let manufacturer_code = caps[1].parse().ok()?;
    let type_code = caps[2].parse().ok()?;
    let serial = caps[3].parse().ok()?;
    Some((manufacturer_code, type_code, serial))
}

// Campos aceitos na criação de um item. `identifier` ausente dispara a
// alocação automática dentro da transação de criação.
#[derive(Debug, Clone)]
pub struct NewItemInput {
    pub title: String,
    pub manufacturer_id: i64,
    pub equipment_type_id: i64,
    pub identifier: Option<String>,
    pub size: Option<String>,
    pub condition: Option<ItemCondition>,
    pub location_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub notes: Option<String>,
}

// Atualização por fusão: `None` = campo não enviado; para colunas
// anuláveis, `Some(None)` limpa o valor.
#[derive(Debug, Default, Clone)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub size: Option<Option<String>>,
    pub condition: Option<ItemCondition>,
    pub condition_note: Option<Option<String>>,
    pub location_id: Option<Option<i64>>,
    pub metadata: Option<serde_json::Value>,
    pub notes: Option<Option<String>>,
}

#[derive(Clone)]
pub struct EquipmentService {
    equipment_repo: EquipmentRepository,
    history_repo: HistoryRepository,
    assignment_repo: AssignmentRepository,
    location_repo: LocationRepository,
    pool: SqlitePool,
}

impl EquipmentService {
    pub fn new(
        equipment_repo: EquipmentRepository,
        history_repo: HistoryRepository,
        assignment_repo: AssignmentRepository,
        location_repo: LocationRepository,
        pool: SqlitePool,
    ) -> Self {
        Self { equipment_repo, history_repo, assignment_repo, location_repo, pool }
    }

    // ---
    // Catálogo: fabricantes
    // ---

    pub async fn create_manufacturer(
        &self,
        name: &str,
        code: Option<i64>,
    ) -> Result<Manufacturer, AppError> {
        let code = match code {
            Some(c) => {
                if !(1..=9999).contains(&c) {
                    return Err(AppError::InvalidInput(
                        "Manufacturer code must be between 1 and 9999".to_string(),
                    ));
                }
                c
            }
            None => self.equipment_repo.next_manufacturer_code().await?,
        };
        self.equipment_repo.create_manufacturer(name, code).await
    }

    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, AppError> {
        self.equipment_repo.list_manufacturers().await
    }

    pub async fn get_manufacturer(&self, id: i64) -> Result<Manufacturer, AppError> {
        self.equipment_repo
            .find_manufacturer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Manufacturer not found: {}", id)))
    }

    pub async fn delete_manufacturer(&self, id: i64) -> Result<(), AppError> {
        self.get_manufacturer(id).await?;
        if self.equipment_repo.manufacturer_in_use(id).await? {
            return Err(AppError::Conflict(
                "Manufacturer is referenced by equipment items and cannot be deleted".to_string(),
            ));
        }
        self.equipment_repo.delete_manufacturer(id).await?;
        Ok(())
    }

    // ---
    // Catálogo: tipos
    // ---

    pub async fn create_type(&self, name: &str, code: Option<i64>) -> Result<EquipmentType, AppError> {
        let code = match code {
            Some(c) => {
                if !(1..=9999).contains(&c) {
                    return Err(AppError::InvalidInput(
                        "Equipment type code must be between 1 and 9999".to_string(),
                    ));
                }
                c
            }
            None => self.equipment_repo.next_type_code().await?,
        };
        self.equipment_repo.create_type(name, code).await
    }

    pub async fn list_types(&self) -> Result<Vec<EquipmentType>, AppError> {
        self.equipment_repo.list_types().await
    }

    pub async fn get_type(&self, id: i64) -> Result<EquipmentType, AppError> {
        self.equipment_repo
            .find_type(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment type not found: {}", id)))
    }

    pub async fn delete_type(&self, id: i64) -> Result<(), AppError> {
        self.get_type(id).await?;
        if self.equipment_repo.type_in_use(id).await? {
            return Err(AppError::Conflict(
                "Equipment type is referenced by equipment items and cannot be deleted".to_string(),
            ));
        }
        self.equipment_repo.delete_type(id).await?;
        Ok(())
    }

    // ---
    // Itens
    // ---

    // Cria o item com o identificador alocado (ou validado) na mesma
    // transação do INSERT. O índice único em (fabricante, tipo, serial)
    // transforma qualquer corrida residual em Conflict.
    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        actor_id: i64,
        input: NewItemInput,
    ) -> Result<EquipmentItem, AppError>
    where
        E: Executor<'e, Database = Sqlite> + sqlx::Acquire<'e, Database = Sqlite>,
    {
        // 1. Valida as referências antes de abrir a transação
        let manufacturer = self.get_manufacturer(input.manufacturer_id).await?;
        let equipment_type = self.get_type(input.equipment_type_id).await?;
        if let Some(location_id) = input.location_id {
            self.location_repo
                .find(location_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Location not found: {}", location_id)))?;
        }

        let mut tx = executor.begin().await?;

        // 2. Resolve identificador + sequencial dentro da transação
        let (identifier, serial_no) = match &input.identifier {
            Some(supplied) => {
                let (m_code, t_code, serial) = parse_identifier(supplied).ok_or_else(|| {
                    AppError::InvalidInput(
                        "Identifier must match the MMMM-TTTT-NNNNN format".to_string(),
                    )
                })?;
                if m_code != manufacturer.code || t_code != equipment_type.code {
                    return Err(AppError::InvalidInput(
                        "Identifier codes do not match the referenced manufacturer and type"
                            .to_string(),
                    ));
                }
                if self.equipment_repo.identifier_exists(&mut *tx, supplied).await? {
                    return Err(AppError::Conflict(format!(
                        "Identifier already in use: {}",
                        supplied
                    )));
                }
                (supplied.clone(), serial)
            }
            None => {
                let max_serial = self
                    .equipment_repo
                    .max_serial_for_pair(&mut *tx, manufacturer.id, equipment_type.id)
                    .await?;
                let serial = max_serial + 1;
                (
                    format_identifier(manufacturer.code, equipment_type.code, serial),
                    serial,
                )
            }
        };

        // 3. Insere o item
        let item = self
            .equipment_repo
            .insert_item(
                &mut *tx,
                &NewItem {
                    identifier,
                    title: input.title,
                    manufacturer_id: manufacturer.id,
                    equipment_type_id: equipment_type.id,
                    serial_no,
                    size: input.size,
                    condition: input.condition.unwrap_or(ItemCondition::Normal),
                    location_id: input.location_id,
                    metadata: input.metadata.unwrap_or_else(|| json!({})),
                    notes: input.notes,
                },
            )
            .await?;

        // 4. Registra a criação no histórico (mesma transação)
        self.history_repo
            .insert(
                &mut *tx,
                item.id,
                HistoryAction::Created,
                Some(actor_id),
                &json!({ "identifier": item.identifier, "title": item.title }),
                Utc::now(),
            )
            .await?;

        tx.commit().await?;
        Ok(item)
    }

    // Fusão dos campos enviados; cada campo alterado entra no diff
    // `{"campo": {"old": ..., "new": ...}}` gravado como uma única
    // entrada `updated` — nada é gravado se o diff for vazio.
    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        actor_id: i64,
        update: ItemUpdate,
    ) -> Result<EquipmentItem, AppError>
    where
        E: Executor<'e, Database = Sqlite> + sqlx::Acquire<'e, Database = Sqlite>,
    {
        // Valida o local fora da transação
        if let Some(Some(location_id)) = update.location_id {
            self.location_repo
                .find(location_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Location not found: {}", location_id)))?;
        }

        let mut tx = executor.begin().await?;

        let current = self
            .equipment_repo
            .find_item_by_id(&mut *tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        let mut item = current.clone();
        let mut diff = serde_json::Map::new();

        if let Some(title) = update.title {
            if title != item.title {
                diff.insert("title".into(), json!({ "old": item.title, "new": title }));
                item.title = title;
            }
        }
        if let Some(size) = update.size {
            if size != item.size {
                diff.insert("size".into(), json!({ "old": item.size, "new": size }));
                item.size = size;
            }
        }
        if let Some(condition) = update.condition {
            if condition != item.condition {
                diff.insert(
                    "condition".into(),
                    json!({ "old": item.condition, "new": condition }),
                );
                item.condition = condition;
                item.condition_changed_at = Some(Utc::now());
            }
        }
        if let Some(note) = update.condition_note {
            if note != item.condition_note {
                diff.insert(
                    "condition_note".into(),
                    json!({ "old": item.condition_note, "new": note }),
                );
                item.condition_note = note;
            }
        }
        if let Some(location_id) = update.location_id {
            if location_id != item.location_id {
                diff.insert(
                    "location_id".into(),
                    json!({ "old": item.location_id, "new": location_id }),
                );
                item.location_id = location_id;
            }
        }
        if let Some(metadata) = update.metadata {
            if metadata != item.metadata {
                diff.insert(
                    "metadata".into(),
                    json!({ "old": item.metadata, "new": metadata }),
                );
                item.metadata = metadata;
            }
        }
        if let Some(notes) = update.notes {
            if notes != item.notes {
                diff.insert("notes".into(), json!({ "old": item.notes, "new": notes }));
                item.notes = notes;
            }
        }

        if diff.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let updated = self.equipment_repo.update_item(&mut *tx, &item).await?;

        self.history_repo
            .insert(
                &mut *tx,
                item_id,
                HistoryAction::Updated,
                Some(actor_id),
                &serde_json::Value::Object(diff),
                Utc::now(),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // Exclusão definitiva: grava a entrada `deleted`, depois remove
    // ledger, histórico e o próprio item na mesma transação.
    pub async fn delete_item<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        actor_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite> + sqlx::Acquire<'e, Database = Sqlite>,
    {
        let mut tx = executor.begin().await?;

        let item = self
            .equipment_repo
            .find_item_by_id(&mut *tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", item_id)))?;

        self.history_repo
            .insert(
                &mut *tx,
                item_id,
                HistoryAction::Deleted,
                Some(actor_id),
                &json!({ "identifier": item.identifier, "title": item.title }),
                Utc::now(),
            )
            .await?;

        self.assignment_repo.delete_for_item(&mut *tx, item_id).await?;
        self.history_repo.delete_for_item(&mut *tx, item_id).await?;
        self.equipment_repo.delete_item(&mut *tx, item_id).await?;

        tx.commit().await?;
        Ok(())
    }

    // Aceita tanto o id numérico quanto o identificador completo.
    pub async fn get_item(&self, reference: &str) -> Result<EquipmentItem, AppError> {
        let found = if let Ok(id) = reference.parse::<i64>() {
            self.equipment_repo.find_item_by_id(&self.pool, id).await?
        } else {
            self.equipment_repo.find_item_by_identifier(reference).await?
        };
        found.ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", reference)))
    }

    pub async fn get_item_by_id(&self, id: i64) -> Result<EquipmentItem, AppError> {
        self.equipment_repo
            .find_item_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment item not found: {}", id)))
    }

    pub async fn search_items(&self, mut filters: ItemSearchFilters) -> Result<Vec<EquipmentItem>, AppError> {
        if filters.limit <= 0 {
            filters.limit = 50;
        }
        filters.limit = filters.limit.min(500);
        if filters.offset < 0 {
            filters.offset = 0;
        }
        self.equipment_repo.search_items(&filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::{format_identifier, parse_identifier};

    #[test]
    fn identifier_round_trips() {
        let identifier = format_identifier(3, 17, 42);
        assert_eq!(identifier, "0003-0017-00042");
        assert_eq!(parse_identifier(&identifier), Some((3, 17, 42)));
    }

    #[test]
    fn identifier_rejects_malformed_strings() {
        assert_eq!(parse_identifier("003-0017-00042"), None);
        assert_eq!(parse_identifier("0003-0017-0042"), None);
        assert_eq!(parse_identifier("0003-0017-00042-extra"), None);
        assert_eq!(parse_identifier("abcd-0017-00042"), None);
        assert_eq!(parse_identifier(""), None);
    }
}
