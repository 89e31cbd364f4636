// src/db/location_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::location::{Location, LocationKind},
};

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub kind: LocationKind,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub capacity: Option<i64>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, location: &NewLocation, now: DateTime<Utc>) -> Result<Location, AppError> {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, slug, parent_id, kind, address, contact, capacity, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&location.name)
        .bind(&location.slug)
        .bind(location.parent_id)
        .bind(location.kind)
        .bind(&location.address)
        .bind(&location.contact)
        .bind(location.capacity)
        .bind(location.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Location slug already exists: {}",
                        location.slug
                    ));
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT * FROM locations
            WHERE (?1 OR is_active = 1)
            ORDER BY name ASC
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(location)
    }

    pub async fn update(&self, location: &Location, now: DateTime<Utc>) -> Result<Location, AppError> {
        let updated = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET name = ?, parent_id = ?, kind = ?, address = ?, contact = ?,
                capacity = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&location.name)
        .bind(location.parent_id)
        .bind(location.kind)
        .bind(&location.address)
        .bind(&location.contact)
        .bind(location.capacity)
        .bind(location.is_active)
        .bind(now)
        .bind(location.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn has_children(&self, id: i64) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE parent_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    // Um local está em uso se algum item o referencia como posição
    // física ou se uma atribuição CLUB ativa aponta para ele.
    pub async fn has_items(&self, id: i64) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM equipment_items WHERE location_id = ?1)
                 + (SELECT COUNT(*) FROM assignments
                    WHERE assignee_kind = 'CLUB' AND assignee_id = ?1 AND unassigned_at IS NULL)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // Garante o local de armazenamento padrão na inicialização e
    // retorna seu id. Idempotente entre reinícios.
    pub async fn ensure_default(&self, slug: &str, name: &str) -> Result<i64, AppError> {
        if let Some(existing) = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(existing.id);
        }

        let now = Utc::now();
        let created = self
            .insert(
                &NewLocation {
                    name: name.to_string(),
                    slug: slug.to_string(),
                    parent_id: None,
                    kind: LocationKind::Storage,
                    address: None,
                    contact: None,
                    capacity: None,
                    is_active: true,
                },
                now,
            )
            .await?;
        Ok(created.id)
    }
}
