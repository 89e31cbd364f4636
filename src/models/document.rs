// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Categoria atribuída pela tabela de regras do parser (primeira regra
// que casar vence; GENERAL é o fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentCategory {
    CompetitionRegulations,
    GameRules,
    RefereeGuidelines,
    DevelopmentSeries,
    SafetyMedical,
    General,
}

// Documento de regras baixado da federação. `content_hash` (SHA-256)
// decide se o arquivo mudou entre execuções do scraper.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub source_url: String,
    pub category: DocumentCategory,
    pub version: Option<String>,
    pub file_path: String,
    pub content_hash: String,
    pub file_size: i64,
    pub first_seen_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrapeTrigger {
    Scheduled,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrapeStatus {
    Running,
    Succeeded,
    Failed,
}

// Uma execução do scraper, agendada ou manual.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRun {
    pub id: i64,
    pub run_uuid: String,
    pub trigger_kind: ScrapeTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: ScrapeStatus,
    pub documents_found: i64,
    pub documents_updated: i64,
    pub documents_failed: i64,
    pub error: Option<String>,
}

// Linha única com o contador de falhas consecutivas e os carimbos da
// última execução / último sucesso.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScraperState {
    pub consecutive_failures: i64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
}

// Notificação durável para operadores, gravada quando o scraper
// acumula falhas consecutivas.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
