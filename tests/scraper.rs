// tests/scraper.rs
//
// O scraper é testado contra um servidor HTTP falso; cada teste usa um
// diretório de documentos próprio em temp para poder verificar os
// arquivos gravados.

use std::time::Duration;

use backend_clubgear::common::error::AppError;
use backend_clubgear::config::ScraperConfig;
use backend_clubgear::db::DocumentRepository;
use backend_clubgear::models::document::{DocumentCategory, ScrapeStatus, ScrapeTrigger};
use backend_clubgear::services::ScraperService;
use mockito::{Server, ServerGuard};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

const PAGE_PATH: &str = "/docs/rules/";

fn test_config(server_url: &str) -> ScraperConfig {
    ScraperConfig {
        source_url: format!("{}{}", server_url, PAGE_PATH),
        user_agent: "clubgear-tests/0.1".to_string(),
        document_dir: std::env::temp_dir().join(format!("clubgear-scraper-{}", Uuid::new_v4())),
        max_retries: 3,
        initial_backoff: Duration::ZERO,
        download_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        schedule_hour: 3,
        schedule_minute: 0,
        enabled: true,
        admin_email: "ops@club.test".to_string(),
    }
}

async fn scraper_for(server: &ServerGuard) -> ScraperService {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    ScraperService::new(DocumentRepository::new(pool), test_config(&server.url()))
        .expect("scraper service")
}

#[tokio::test]
async fn run_stores_documents_and_marks_success() {
    let mut server = Server::new_async().await;
    let scraper = scraper_for(&server).await;

    let html = r#"
        <h1>Spelregler och tävlingsbestämmelser</h1>
        <a href="/files/Tavlingsbestammelser-2024.pdf"><strong>Tävlingsbestämmelser 2024</strong></a>
        <a href="/files/spelregler.docx" class="btn">Ladda ner: Spelregler</a>
        <a href="/om-oss/">Om oss</a>
    "#;
    let regulations_body = b"%PDF-1.4 competition regulations";
    let rules_body = b"PK rules document";
    server.mock("GET", PAGE_PATH).with_status(200).with_body(html).create();
    server
        .mock("GET", "/files/Tavlingsbestammelser-2024.pdf")
        .with_status(200)
        .with_body(regulations_body)
        .create();
    server
        .mock("GET", "/files/spelregler.docx")
        .with_status(200)
        .with_body(rules_body)
        .create();

    let run = scraper.run_scrape(ScrapeTrigger::Manual).await.expect("run");
    assert_eq!(run.status, ScrapeStatus::Succeeded);
    assert_eq!(run.trigger_kind, ScrapeTrigger::Manual);
    assert_eq!(run.documents_found, 2);
    assert_eq!(run.documents_updated, 2);
    assert_eq!(run.documents_failed, 0);
    assert!(run.finished_at.is_some());

    let documents = scraper.list_documents(None).await.expect("documents");
    assert_eq!(documents.len(), 2);

    let regulations = documents
        .iter()
        .find(|d| d.category == DocumentCategory::CompetitionRegulations)
        .expect("regulations document");
    assert_eq!(regulations.title, "Tävlingsbestämmelser 2024");
    assert_eq!(regulations.version.as_deref(), Some("2024"));
    assert_eq!(regulations.file_size, regulations_body.len() as i64);

    let rules = documents
        .iter()
        .find(|d| d.category == DocumentCategory::GameRules)
        .expect("rules document");
    assert_eq!(rules.title, "Spelregler");
    assert_eq!(rules.version, None);

    for document in &documents {
        assert!(tokio::fs::metadata(&document.file_path).await.is_ok());
    }

    let state = scraper.state().await.expect("state");
    assert_eq!(state.consecutive_failures, 0);
    assert!(state.last_run_at.is_some());
    assert!(state.last_success_at.is_some());
}

#[tokio::test]
async fn unchanged_content_is_skipped_on_reruns() {
    let mut server = Server::new_async().await;
    let scraper = scraper_for(&server).await;

    let html = r#"<a href="/files/regelbok-2024.pdf">Regelbok 2024</a>"#;
    server.mock("GET", PAGE_PATH).with_status(200).with_body(html).create();
    let document_mock = server
        .mock("GET", "/files/regelbok-2024.pdf")
        .with_status(200)
        .with_body("regelbok v1")
        .expect(2)
        .create();

    scraper.run_scrape(ScrapeTrigger::Manual).await.expect("first run");
    let first = scraper.list_documents(None).await.expect("documents")[0].clone();

    let second_run = scraper.run_scrape(ScrapeTrigger::Manual).await.expect("second run");
    assert_eq!(second_run.documents_found, 1);
    assert_eq!(second_run.documents_updated, 0);

    let documents = scraper.list_documents(None).await.expect("documents");
    assert_eq!(documents.len(), 1);
    let second = &documents[0];
    assert_eq!(second.id, first.id);
    assert_eq!(second.content_hash, first.content_hash);
    assert_eq!(second.file_path, first.file_path);
    assert_eq!(second.last_updated_at, first.last_updated_at);
    assert!(second.last_checked_at >= first.last_checked_at);

    // O corpo é baixado nas duas execuções; só a gravação é pulada.
    document_mock.assert();
}

#[tokio::test]
async fn changed_content_replaces_the_stored_file() {
    let mut server = Server::new_async().await;
    let scraper = scraper_for(&server).await;

    let html = r#"<a href="/files/regelbok-2024.pdf">Regelbok 2024</a>"#;
    server.mock("GET", PAGE_PATH).with_status(200).with_body(html).create();
    server
        .mock("GET", "/files/regelbok-2024.pdf")
        .with_status(200)
        .with_body("regelbok v1")
        .create();

    scraper.run_scrape(ScrapeTrigger::Manual).await.expect("first run");
    let first = scraper.list_documents(None).await.expect("documents")[0].clone();

    // O mock registrado por último passa a responder pela mesma rota.
    let new_body = "regelbok v2 med ändringar";
    server
        .mock("GET", "/files/regelbok-2024.pdf")
        .with_status(200)
        .with_body(new_body)
        .create();

    let second_run = scraper.run_scrape(ScrapeTrigger::Manual).await.expect("second run");
    assert_eq!(second_run.documents_updated, 1);

    let documents = scraper.list_documents(None).await.expect("documents");
    assert_eq!(documents.len(), 1);
    let second = &documents[0];
    assert_eq!(second.id, first.id);
    assert_ne!(second.content_hash, first.content_hash);
    assert_eq!(second.file_size, new_body.len() as i64);
    assert_ne!(second.file_path, first.file_path);
    assert!(tokio::fs::metadata(&second.file_path).await.is_ok());
    assert!(tokio::fs::metadata(&first.file_path).await.is_err());
}

#[tokio::test]
async fn fetch_retries_before_failing_the_run() {
    let mut server = Server::new_async().await;
    let scraper = scraper_for(&server).await;

    let page_mock = server.mock("GET", PAGE_PATH).with_status(500).expect(3).create();

    let err = scraper.run_scrape(ScrapeTrigger::Scheduled).await.expect_err("must fail");
    assert!(matches!(err, AppError::UpstreamError(_)));
    page_mock.assert();

    let runs = scraper.list_runs(10).await.expect("runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, ScrapeStatus::Failed);
    let error = runs[0].error.as_deref().expect("error recorded");
    assert!(error.contains("3 attempts"));

    let state = scraper.state().await.expect("state");
    assert_eq!(state.consecutive_failures, 1);
    assert!(state.last_success_at.is_none());
}

#[tokio::test]
async fn repeated_failures_escalate_to_operators() {
    let mut server = Server::new_async().await;
    let scraper = scraper_for(&server).await;

    server.mock("GET", PAGE_PATH).with_status(500).create();

    for _ in 0..3 {
        scraper.run_scrape(ScrapeTrigger::Scheduled).await.expect_err("must fail");
    }

    let state = scraper.state().await.expect("state");
    assert_eq!(state.consecutive_failures, 3);

    let notifications = scraper.list_notifications(10).await.expect("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient, "ops@club.test");
    assert_eq!(notifications[0].subject, "Document scraper is failing");
    assert!(notifications[0].body.contains("3 consecutive times"));

    // Um sucesso zera o contador sem apagar o aviso já registrado.
    server
        .mock("GET", PAGE_PATH)
        .with_status(200)
        .with_body("<p>Inga dokument just nu</p>")
        .create();
    let run = scraper.run_scrape(ScrapeTrigger::Scheduled).await.expect("recovery run");
    assert_eq!(run.documents_found, 0);

    let state = scraper.state().await.expect("state");
    assert_eq!(state.consecutive_failures, 0);
    assert!(state.last_success_at.is_some());
    assert_eq!(scraper.list_notifications(10).await.expect("notifications").len(), 1);
}
