// src/db/document_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::document::{
        Document, DocumentCategory, Notification, ScrapeRun, ScrapeStatus, ScrapeTrigger,
        ScraperState,
    },
};

// Campos de um documento recém-baixado, antes de existir no banco.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub source_url: String,
    pub category: DocumentCategory,
    pub version: Option<String>,
    pub file_path: String,
    pub content_hash: String,
    pub file_size: i64,
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Documentos
    // ---

    pub async fn find_by_source_url(&self, source_url: &str) -> Result<Option<Document>, AppError> {
        let doc = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE source_url = ?")
            .bind(source_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    pub async fn insert_document(
        &self,
        doc: &NewDocument,
        now: DateTime<Utc>,
    ) -> Result<Document, AppError> {
        let created = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (title, source_url, category, version, file_path,
                                   content_hash, file_size, first_seen_at, last_checked_at, last_updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&doc.title)
        .bind(&doc.source_url)
        .bind(doc.category)
        .bind(&doc.version)
        .bind(&doc.file_path)
        .bind(&doc.content_hash)
        .bind(doc.file_size)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    // Conteúdo mudou: troca arquivo, hash e metadados derivados.
    pub async fn update_document_content(
        &self,
        id: i64,
        doc: &NewDocument,
        now: DateTime<Utc>,
    ) -> Result<Document, AppError> {
        let updated = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET title = ?, category = ?, version = ?, file_path = ?,
                content_hash = ?, file_size = ?, last_checked_at = ?, last_updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&doc.title)
        .bind(doc.category)
        .bind(&doc.version)
        .bind(&doc.file_path)
        .bind(&doc.content_hash)
        .bind(doc.file_size)
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    // Conteúdo idêntico: registra apenas que foi verificado.
    pub async fn touch_last_checked(&self, id: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE documents SET last_checked_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list(&self, category: Option<DocumentCategory>) -> Result<Vec<Document>, AppError> {
        let docs = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE (?1 IS NULL OR category = ?1)
            ORDER BY last_updated_at DESC, title ASC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Document>, AppError> {
        let doc = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    // ---
    // Execuções do scraper
    // ---

    pub async fn insert_run(
        &self,
        run_uuid: &str,
        trigger: ScrapeTrigger,
        started_at: DateTime<Utc>,
    ) -> Result<ScrapeRun, AppError> {
        let run = sqlx::query_as::<_, ScrapeRun>(
            r#"
            INSERT INTO scrape_runs (run_uuid, trigger_kind, started_at, status)
            VALUES (?, ?, ?, 'RUNNING')
            RETURNING *
            "#,
        )
        .bind(run_uuid)
        .bind(trigger)
        .bind(started_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(run)
    }

    pub async fn finish_run(
        &self,
        id: i64,
        status: ScrapeStatus,
        found: i64,
        updated: i64,
        failed: i64,
        error: Option<&str>,
        finished_at: DateTime<Utc>,
    ) -> Result<ScrapeRun, AppError> {
        let run = sqlx::query_as::<_, ScrapeRun>(
            r#"
            UPDATE scrape_runs
            SET status = ?, documents_found = ?, documents_updated = ?,
                documents_failed = ?, error = ?, finished_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(found)
        .bind(updated)
        .bind(failed)
        .bind(error)
        .bind(finished_at)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(run)
    }

    pub async fn list_runs(&self, limit: i64) -> Result<Vec<ScrapeRun>, AppError> {
        let runs = sqlx::query_as::<_, ScrapeRun>(
            "SELECT * FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }

    // ---
    // Estado do scraper e escalada
    // ---

    pub async fn get_state(&self) -> Result<ScraperState, AppError> {
        let state = sqlx::query_as::<_, ScraperState>(
            "SELECT consecutive_failures, last_run_at, last_success_at FROM scraper_state WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(state)
    }

    // Atualiza o contador de falhas consecutivas e devolve o valor novo.
    // Sucesso zera o contador e carimba last_success_at.
    pub async fn record_run_outcome(
        &self,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let failures: i64 = if success {
            sqlx::query_scalar(
                r#"
                UPDATE scraper_state
                SET consecutive_failures = 0, last_run_at = ?1, last_success_at = ?1
                WHERE id = 1
                RETURNING consecutive_failures
                "#,
            )
            .bind(at)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                r#"
                UPDATE scraper_state
                SET consecutive_failures = consecutive_failures + 1, last_run_at = ?
                WHERE id = 1
                RETURNING consecutive_failures
                "#,
            )
            .bind(at)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(failures)
    }

    pub async fn insert_notification(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient, subject, body, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(recipient)
        .bind(subject)
        .bind(body)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }
}
