// src/db/equipment_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::{
        catalog::{EquipmentType, Manufacturer},
        equipment::{EquipmentItem, ItemCondition},
    },
};

// Filtros da busca de itens. Todos opcionais; `text` cobre título,
// identificador e notas.
#[derive(Debug, Default, Clone)]
pub struct ItemSearchFilters {
    pub text: Option<String>,
    pub manufacturer_id: Option<i64>,
    pub equipment_type_id: Option<i64>,
    pub condition: Option<ItemCondition>,
    pub location_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

// Campos de um item novo; o serviço decide identifier/serial_no antes
// do INSERT (dentro da transação de criação).
#[derive(Debug, Clone)]
pub struct NewItem {
    pub identifier: String,
    pub title: String,
    pub manufacturer_id: i64,
    pub equipment_type_id: i64,
    pub serial_no: i64,
    pub size: Option<String>,
    pub condition: ItemCondition,
    pub location_id: Option<i64>,
    pub metadata: serde_json::Value,
    pub notes: Option<String>,
}

// Contagem agregada para o relatório PDF.
#[derive(Debug, sqlx::FromRow)]
pub struct TypeConditionCount {
    pub type_name: String,
    pub condition: ItemCondition,
    pub count: i64,
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: SqlitePool,
}

impl EquipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Catálogo: fabricantes
    // ---

    pub async fn create_manufacturer(&self, name: &str, code: i64) -> Result<Manufacturer, AppError> {
        sqlx::query_as::<_, Manufacturer>(
            "INSERT INTO manufacturers (name, code, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Manufacturer name or code already in use: {} ({:04})",
                        name, code
                    ));
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, AppError> {
        let rows = sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_manufacturer(&self, id: i64) -> Result<Option<Manufacturer>, AppError> {
        let row = sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn next_manufacturer_code(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(code), 0) + 1 FROM manufacturers")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn manufacturer_in_use(&self, id: i64) -> Result<bool, AppError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM equipment_items WHERE manufacturer_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    pub async fn delete_manufacturer(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Catálogo: tipos de equipamento
    // ---

    pub async fn create_type(&self, name: &str, code: i64) -> Result<EquipmentType, AppError> {
        sqlx::query_as::<_, EquipmentType>(
            "INSERT INTO equipment_types (name, code, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Equipment type name or code already in use: {} ({:04})",
                        name, code
                    ));
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn list_types(&self) -> Result<Vec<EquipmentType>, AppError> {
        let rows = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_type(&self, id: i64) -> Result<Option<EquipmentType>, AppError> {
        let row = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn next_type_code(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(code), 0) + 1 FROM equipment_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn type_in_use(&self, id: i64) -> Result<bool, AppError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM equipment_items WHERE equipment_type_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    pub async fn delete_type(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Itens
    // ---

    // Maior sequencial já usado para o par (fabricante, tipo). Lido
    // dentro da transação de criação, junto do INSERT.
    pub async fn max_serial_for_pair<'e, E>(
        &self,
        executor: E,
        manufacturer_id: i64,
        equipment_type_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(MAX(serial_no), 0)
            FROM equipment_items
            WHERE manufacturer_id = ? AND equipment_type_id = ?
            "#,
        )
        .bind(manufacturer_id)
        .bind(equipment_type_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    pub async fn insert_item<'e, E>(&self, executor: E, item: &NewItem) -> Result<EquipmentItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, EquipmentItem>(
            r#"
            INSERT INTO equipment_items
                (identifier, title, manufacturer_id, equipment_type_id, serial_no, size,
                 condition, location_id, metadata, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&item.identifier)
        .bind(&item.title)
        .bind(item.manufacturer_id)
        .bind(item.equipment_type_id)
        .bind(item.serial_no)
        .bind(&item.size)
        .bind(item.condition)
        .bind(item.location_id)
        .bind(&item.metadata)
        .bind(&item.notes)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Identifier already exists: {}",
                        item.identifier
                    ));
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn find_item_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<EquipmentItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, EquipmentItem>("SELECT * FROM equipment_items WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn find_item_by_identifier(&self, identifier: &str) -> Result<Option<EquipmentItem>, AppError> {
        let row = sqlx::query_as::<_, EquipmentItem>("SELECT * FROM equipment_items WHERE identifier = ?")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // Checagem dentro da transação de criação, para negar identificador
    // duplicado com 409 em vez de estourar a constraint UNIQUE.
    pub async fn identifier_exists<'e, E>(&self, executor: E, identifier: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment_items WHERE identifier = ?")
            .bind(identifier)
            .fetch_one(executor)
            .await?;
        Ok(row.0 > 0)
    }

    // Atualiza os campos mutáveis do item (identifier, fabricante, tipo
    // e serial são imutáveis depois da criação).
    pub async fn update_item<'e, E>(&self, executor: E, item: &EquipmentItem) -> Result<EquipmentItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, EquipmentItem>(
            r#"
            UPDATE equipment_items
            SET title = ?, size = ?, condition = ?, condition_note = ?,
                condition_changed_at = ?, location_id = ?, metadata = ?, notes = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&item.title)
        .bind(&item.size)
        .bind(item.condition)
        .bind(&item.condition_note)
        .bind(item.condition_changed_at)
        .bind(item.location_id)
        .bind(&item.metadata)
        .bind(&item.notes)
        .bind(Utc::now())
        .bind(item.id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM equipment_items WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn search_items(&self, filters: &ItemSearchFilters) -> Result<Vec<EquipmentItem>, AppError> {
        let text = filters.text.as_ref().map(|t| format!("%{}%", t));
        let rows = sqlx::query_as::<_, EquipmentItem>(
            r#"
            SELECT *
            FROM equipment_items
            WHERE (?1 IS NULL OR title LIKE ?1 OR identifier LIKE ?1 OR notes LIKE ?1)
              AND (?2 IS NULL OR manufacturer_id = ?2)
              AND (?3 IS NULL OR equipment_type_id = ?3)
              AND (?4 IS NULL OR condition = ?4)
              AND (?5 IS NULL OR location_id = ?5)
            ORDER BY identifier ASC
            LIMIT ?6 OFFSET ?7
            "#,
        )
        .bind(text)
        .bind(filters.manufacturer_id)
        .bind(filters.equipment_type_id)
        .bind(filters.condition)
        .bind(filters.location_id)
        .bind(filters.limit)
        .bind(filters.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---
    // Agregados para o relatório
    // ---

    pub async fn counts_by_type_and_condition(&self) -> Result<Vec<TypeConditionCount>, AppError> {
        let rows = sqlx::query_as::<_, TypeConditionCount>(
            r#"
            SELECT t.name AS type_name, i.condition AS condition, COUNT(*) AS count
            FROM equipment_items i
            JOIN equipment_types t ON t.id = i.equipment_type_id
            GROUP BY t.name, i.condition
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_items(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
