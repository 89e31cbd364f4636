// src/services/directory_service.rs

use crate::{
    common::error::AppError,
    db::{DirectoryRepository, UserRepository},
    models::directory::{Team, TeamMember, TeamMemberRole},
};

#[derive(Clone)]
pub struct DirectoryService {
    directory_repo: DirectoryRepository,
    user_repo: UserRepository,
}

impl DirectoryService {
    pub fn new(directory_repo: DirectoryRepository, user_repo: UserRepository) -> Self {
        Self { directory_repo, user_repo }
    }

    pub async fn create_team(&self, name: &str) -> Result<Team, AppError> {
        self.directory_repo.create_team(name).await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        self.directory_repo.list_teams().await
    }

    pub async fn get_team(&self, team_id: i64) -> Result<Team, AppError> {
        self.directory_repo
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team not found: {}", team_id)))
    }

    pub async fn add_member(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamMemberRole,
    ) -> Result<TeamMember, AppError> {
        // Valida as duas pontas antes de inserir
        self.get_team(team_id).await?;
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))?;

        self.directory_repo.add_member(team_id, user_id, role).await
    }

    pub async fn list_members(&self, team_id: i64) -> Result<Vec<TeamMember>, AppError> {
        self.get_team(team_id).await?;
        self.directory_repo.list_members(team_id).await
    }
}
