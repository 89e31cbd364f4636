// src/services/scraper_service.rs

use std::path::PathBuf;

use chrono::Utc;
use reqwest::Url;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::ScraperConfig,
    db::{document_repo::NewDocument, DocumentRepository},
    models::document::{
        Document, DocumentCategory, Notification, ScrapeRun, ScrapeStatus, ScrapeTrigger,
        ScraperState,
    },
    services::scrape_parser::{self, DocumentLink},
};

// Falhas consecutivas a partir das quais os operadores são avisados.
const FAILURE_ESCALATION_THRESHOLD: i64 = 3;

struct RunCounts {
    found: i64,
    updated: i64,
    failed: i64,
}

enum DocumentOutcome {
    Updated,
    Unchanged,
}

#[derive(Clone)]
pub struct ScraperService {
    document_repo: DocumentRepository,
    config: ScraperConfig,
    http: reqwest::Client,
}

impl ScraperService {
    pub fn new(document_repo: DocumentRepository, config: ScraperConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { document_repo, config, http })
    }

    // --- RUN ---
    // Uma execução completa: registra a linha RUNNING, varre a página,
    // processa documento a documento e fecha a linha com o desfecho.
    // Falha de documento individual não derruba a execução; falha no
    // fetch da própria página sim.
    pub async fn run_scrape(&self, trigger: ScrapeTrigger) -> Result<ScrapeRun, AppError> {
        let run = self
            .document_repo
            .insert_run(&Uuid::new_v4().to_string(), trigger, Utc::now())
            .await?;
        tracing::info!("🚀 Scrape iniciado (run {})", run.run_uuid);

        match self.execute().await {
            Ok(counts) => {
                let finished = self
                    .document_repo
                    .finish_run(
                        run.id,
                        ScrapeStatus::Succeeded,
                        counts.found,
                        counts.updated,
                        counts.failed,
                        None,
                        Utc::now(),
                    )
                    .await?;
                self.document_repo.record_run_outcome(true, Utc::now()).await?;
                tracing::info!(
                    "✅ Scrape concluído: {} documentos, {} atualizados, {} falhas",
                    counts.found,
                    counts.updated,
                    counts.failed
                );
                Ok(finished)
            }
            Err(e) => {
                let message = e.to_string();
                self.document_repo
                    .finish_run(
                        run.id,
                        ScrapeStatus::Failed,
                        0,
                        0,
                        0,
                        Some(&message),
                        Utc::now(),
                    )
                    .await?;
                let failures = self.document_repo.record_run_outcome(false, Utc::now()).await?;
                if failures >= FAILURE_ESCALATION_THRESHOLD {
                    self.escalate(failures, &message).await?;
                }
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<RunCounts, AppError> {
        let base = Url::parse(&self.config.source_url).map_err(|e| {
            AppError::InvalidInput(format!("Invalid scraper source URL: {}", e))
        })?;

        let page = self.fetch_bytes_with_retry(base.as_str()).await?;
        let html = String::from_utf8_lossy(&page);
        let links = scrape_parser::extract_document_links(&html, &base);

        let mut counts = RunCounts { found: links.len() as i64, updated: 0, failed: 0 };
        for (index, link) in links.iter().enumerate() {
            // Intervalo de cortesia entre downloads
            if index > 0 {
                tokio::time::sleep(self.config.download_delay).await;
            }
            match self.process_document(link).await {
                Ok(DocumentOutcome::Updated) => counts.updated += 1,
                Ok(DocumentOutcome::Unchanged) => {}
                Err(e) => {
                    counts.failed += 1;
                    tracing::warn!("⚠️ Falha ao processar {}: {}", link.url, e);
                }
            }
        }

        Ok(counts)
    }

    // Baixa, calcula o hash e decide entre pular (conteúdo idêntico),
    // atualizar ou criar o registro local.
    async fn process_document(&self, link: &DocumentLink) -> Result<DocumentOutcome, AppError> {
        let bytes = self.fetch_bytes_with_retry(&link.url).await?;
        let content_hash = hex_digest(&bytes);
        let now = Utc::now();

        let existing = self.document_repo.find_by_source_url(&link.url).await?;
        if let Some(existing) = &existing {
            if existing.content_hash == content_hash {
                self.document_repo.touch_last_checked(existing.id, now).await?;
                return Ok(DocumentOutcome::Unchanged);
            }
        }

        let file_path = self.store_file(&link.url, &bytes).await?;
        let classification_text = format!("{} {}", link.title, link.url);
        let new_doc = NewDocument {
            title: link.title.clone(),
            source_url: link.url.clone(),
            category: scrape_parser::classify(&classification_text),
            version: scrape_parser::extract_version(&link.title),
            file_path: file_path.to_string_lossy().into_owned(),
            content_hash,
            file_size: bytes.len() as i64,
        };

        match existing {
            Some(old) => {
                self.document_repo.update_document_content(old.id, &new_doc, now).await?;
                // O arquivo anterior deixa de ser referenciado
                let _ = tokio::fs::remove_file(&old.file_path).await;
            }
            None => {
                self.document_repo.insert_document(&new_doc, now).await?;
            }
        }
        Ok(DocumentOutcome::Updated)
    }

    // GET com até `max_retries` tentativas e backoff exponencial
    // (inicial × 2^(tentativa-1)). Não-2xx conta como tentativa.
    async fn fetch_bytes_with_retry(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let mut last_error = String::new();
        for attempt in 1..=self.config.max_retries {
            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.bytes().await {
                            Ok(body) => return Ok(body.to_vec()),
                            Err(e) => last_error = e.to_string(),
                        }
                    } else {
                        last_error = format!("unexpected status {}", status);
                    }
                }
                Err(e) => last_error = e.to_string(),
            }

            if attempt < self.config.max_retries {
                let backoff = self.config.initial_backoff * 2u32.pow(attempt - 1);
                tracing::warn!(
                    "⚠️ Tentativa {}/{} falhou para {} ({}); nova tentativa em {:?}",
                    attempt,
                    self.config.max_retries,
                    url,
                    last_error,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
        }
        Err(AppError::UpstreamError(format!(
            "{} ({} attempts): {}",
            url, self.config.max_retries, last_error
        )))
    }

    // Grava o corpo baixado em disco com um nome impossível de colidir.
    async fn store_file(&self, source_url: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.config.document_dir).await?;
        let basename = source_url
            .split(['?', '#'])
            .next()
            .and_then(|p| p.rsplit('/').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("document");
        let file_name = format!("swe3-{}-{}", Uuid::new_v4(), sanitize_filename(basename));
        let path = self.config.document_dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn escalate(&self, failures: i64, last_error: &str) -> Result<(), AppError> {
        tracing::error!(
            "🚨 Scraper com {} falhas consecutivas; notificando {}",
            failures,
            self.config.admin_email
        );
        self.document_repo
            .insert_notification(
                &self.config.admin_email,
                "Document scraper is failing",
                &format!(
                    "The document scraper has failed {} consecutive times. Last error: {}",
                    failures, last_error
                ),
                Utc::now(),
            )
            .await?;
        Ok(())
    }

    // --- READS ---

    pub async fn list_documents(
        &self,
        category: Option<DocumentCategory>,
    ) -> Result<Vec<Document>, AppError> {
        self.document_repo.list(category).await
    }

    pub async fn get_document(&self, id: i64) -> Result<Document, AppError> {
        self.document_repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", id)))
    }

    pub async fn list_runs(&self, limit: i64) -> Result<Vec<ScrapeRun>, AppError> {
        let limit = if limit <= 0 { 20 } else { limit.min(100) };
        self.document_repo.list_runs(limit).await
    }

    pub async fn state(&self) -> Result<ScraperState, AppError> {
        self.document_repo.get_state().await
    }

    pub async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let limit = if limit <= 0 { 20 } else { limit.min(100) };
        self.document_repo.list_notifications(limit).await
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{hex_digest, sanitize_filename};

    #[test]
    fn digest_is_hex_sha256() {
        // sha256 de corpo vazio, valor conhecido
        assert_eq!(
            hex_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hex_digest(b"abc").len(), 64);
    }

    #[test]
    fn filenames_keep_only_safe_characters() {
        assert_eq!(sanitize_filename("regelbok 2024 (ny).pdf"), "regelbok-2024--ny-.pdf");
        assert_eq!(sanitize_filename("åäö.pdf"), "---.pdf");
    }
}
