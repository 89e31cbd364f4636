// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// 1. O trait que define o que é uma permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

// 2. O extractor (guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// Matriz estática papel → permissões. ADMIN passa em tudo; MANAGER
// administra equipamentos e documentos; MEMBER é somente leitura.
fn role_allows(role: UserRole, permission: &str) -> bool {
    match role {
        UserRole::Admin => true,
        UserRole::Manager => matches!(permission, "equipment:manage" | "documents:manage"),
        UserRole::Member => false,
    }
}

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o usuário injetado pelo auth_guard
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        // B. Verifica na matriz
        let required_perm = T::slug();

        if !role_allows(user.role, required_perm) {
            return Err(AppError::PermissionDenied(format!(
                "You need the '{}' permission to perform this action",
                required_perm
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermEquipmentManage;
impl PermissionDef for PermEquipmentManage {
    fn slug() -> &'static str {
        "equipment:manage"
    }
}

pub struct PermDocumentsManage;
impl PermissionDef for PermDocumentsManage {
    fn slug() -> &'static str {
        "documents:manage"
    }
}

pub struct PermHistoryClean;
impl PermissionDef for PermHistoryClean {
    fn slug() -> &'static str {
        "history:clean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_permission() {
        assert!(role_allows(UserRole::Admin, "equipment:manage"));
        assert!(role_allows(UserRole::Admin, "documents:manage"));
        assert!(role_allows(UserRole::Admin, "history:clean"));
    }

    #[test]
    fn manager_cannot_clean_history() {
        assert!(role_allows(UserRole::Manager, "equipment:manage"));
        assert!(role_allows(UserRole::Manager, "documents:manage"));
        assert!(!role_allows(UserRole::Manager, "history:clean"));
    }

    #[test]
    fn member_is_read_only() {
        assert!(!role_allows(UserRole::Member, "equipment:manage"));
        assert!(!role_allows(UserRole::Member, "documents:manage"));
        assert!(!role_allows(UserRole::Member, "history:clean"));
    }
}
