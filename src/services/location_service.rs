// src/services/location_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{location_repo::NewLocation, LocationRepository},
    models::location::{Location, LocationKind},
};

#[derive(Clone)]
pub struct LocationService {
    location_repo: LocationRepository,
}

impl LocationService {
    pub fn new(location_repo: LocationRepository) -> Self {
        Self { location_repo }
    }

    // --- CREATE ---
    // O slug é derivado do nome; colisões recebem sufixo numérico
    // ("garage", "garage-2", "garage-3", ...). Imutável depois.
    pub async fn create_location(
        &self,
        name: &str,
        parent_id: Option<i64>,
        kind: LocationKind,
        address: Option<String>,
        contact: Option<String>,
        capacity: Option<i64>,
    ) -> Result<Location, AppError> {
        if let Some(pid) = parent_id {
            self.get_location(pid).await?;
        }

        let base_slug = slugify(name);
        let mut slug = base_slug.clone();
        let mut suffix = 2;
        while self.location_repo.slug_exists(&slug).await? {
            slug = format!("{}-{}", base_slug, suffix);
            suffix += 1;
        }

        self.location_repo
            .insert(
                &NewLocation {
                    name: name.to_string(),
                    slug,
                    parent_id,
                    kind,
                    address,
                    contact,
                    capacity,
                    is_active: true,
                },
                Utc::now(),
            )
            .await
    }

    pub async fn list_locations(&self, include_inactive: bool) -> Result<Vec<Location>, AppError> {
        self.location_repo.list(include_inactive).await
    }

    pub async fn get_location(&self, id: i64) -> Result<Location, AppError> {
        self.location_repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location not found: {}", id)))
    }

    // --- UPDATE ---
    pub async fn update_location(
        &self,
        id: i64,
        name: Option<String>,
        parent_id: Option<Option<i64>>,
        kind: Option<LocationKind>,
        address: Option<Option<String>>,
        contact: Option<Option<String>>,
        capacity: Option<Option<i64>>,
        is_active: Option<bool>,
    ) -> Result<Location, AppError> {
        let mut location = self.get_location(id).await?;

        if let Some(new_parent) = parent_id {
            if new_parent == Some(id) {
                return Err(AppError::InvalidInput(
                    "Location cannot be its own parent".to_string(),
                ));
            }
            if let Some(pid) = new_parent {
                self.get_location(pid).await?;
            }
            location.parent_id = new_parent;
        }
        if let Some(name) = name {
            location.name = name;
        }
        if let Some(kind) = kind {
            location.kind = kind;
        }
        if let Some(address) = address {
            location.address = address;
        }
        if let Some(contact) = contact {
            location.contact = contact;
        }
        if let Some(capacity) = capacity {
            location.capacity = capacity;
        }
        if let Some(is_active) = is_active {
            location.is_active = is_active;
        }

        self.location_repo.update(&location, Utc::now()).await
    }

    // --- DELETE ---
    // Bloqueada enquanto houver filhos ou itens/atribuições apontando
    // para o local.
    pub async fn delete_location(&self, id: i64) -> Result<(), AppError> {
        self.get_location(id).await?;

        if self.location_repo.has_children(id).await? {
            return Err(AppError::Conflict(
                "Location has child locations and cannot be deleted".to_string(),
            ));
        }
        if self.location_repo.has_items(id).await? {
            return Err(AppError::Conflict(
                "Location has equipment items or active assignments and cannot be deleted"
                    .to_string(),
            ));
        }

        self.location_repo.delete(id).await?;
        Ok(())
    }
}

// Normaliza um nome para slug: minúsculas, [a-z0-9] mantidos, resto
// colapsado em hífens.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for c in name.chars() {
        let lower = c.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            slug.push(lower);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("location");
    }
    slug
}
