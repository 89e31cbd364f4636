// src/db/directory_repo.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::directory::{Team, TeamMember, TeamMemberRole},
};

// Diretório local de times e elenco: resolve existência, nomes e
// pertencimento para o ledger e para o estimador.
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_team(&self, name: &str) -> Result<Team, AppError> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, created_at) VALUES (?, ?) RETURNING *",
        )
        .bind(name)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("Team '{}' already exists", name));
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(teams)
    }

    pub async fn find_team(&self, id: i64) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    pub async fn list_members(&self, team_id: i64) -> Result<Vec<TeamMember>, AppError> {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE team_id = ? ORDER BY user_id ASC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    pub async fn add_member(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamMemberRole,
    ) -> Result<TeamMember, AppError> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("User is already a member of this team".to_string());
                }
            }
            AppError::DatabaseError(e)
        })
    }

    // Número de jogadores no elenco (entrada do estimador de
    // necessidades).
    pub async fn roster_count(&self, team_id: i64) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE team_id = ? AND role = 'PLAYER'",
        )
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    pub async fn is_member(&self, team_id: i64, user_id: i64) -> Result<bool, AppError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 > 0)
    }

    // O observador é técnico/gerente de algum time do dono do item?
    pub async fn is_staff_of_user(&self, viewer_id: i64, owner_id: i64) -> Result<bool, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM team_members owner_m
            JOIN team_members viewer_m ON viewer_m.team_id = owner_m.team_id
            WHERE owner_m.user_id = ?
              AND viewer_m.user_id = ?
              AND viewer_m.role IN ('COACH', 'MANAGER')
            "#,
        )
        .bind(owner_id)
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 > 0)
    }
}
