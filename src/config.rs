// src/config.rs

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::{env, path::PathBuf, time::Duration};

use crate::{
    db::{
        AnalyticsRepository, AssignmentRepository, DirectoryRepository, DocumentRepository,
        EquipmentRepository, HistoryRepository, LocationRepository, UserRepository,
    },
    services::{
        AnalyticsService, AssignmentService, AuthService, ConflictService, DirectoryService,
        EquipmentService, HistoryService, LocationService, ReportService, ScraperService,
    },
};

// Página do SWE3 com as regras e tävlingsbestämmelser publicadas.
const DEFAULT_SOURCE_URL: &str =
    "https://amerikanskfotboll.swe3.se/information-verktyg/spelregler-tavlingsbestammelser/";

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

// Configuração do coletor de documentos. Atrasos e tentativas são
// parametrizados para que os testes possam zerá-los.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub source_url: String,
    pub user_agent: String,
    pub document_dir: PathBuf,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub download_delay: Duration,
    pub request_timeout: Duration,
    pub schedule_hour: u32,
    pub schedule_minute: u32,
    pub enabled: bool,
    pub admin_email: String,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        Self {
            source_url: env_string("SCRAPER_SOURCE_URL", DEFAULT_SOURCE_URL),
            user_agent: env_string(
                "SCRAPER_USER_AGENT",
                "backend_clubgear/0.1 (equipment document sync)",
            ),
            document_dir: PathBuf::from(env_string("SCRAPER_DOCUMENT_DIR", "./documents/swe3")),
            max_retries: env_parse("SCRAPER_MAX_RETRIES", 3),
            initial_backoff: Duration::from_secs(env_parse("SCRAPER_INITIAL_BACKOFF_SECS", 2)),
            download_delay: Duration::from_secs(env_parse("SCRAPER_DOWNLOAD_DELAY_SECS", 2)),
            request_timeout: Duration::from_secs(env_parse("SCRAPER_REQUEST_TIMEOUT_SECS", 30)),
            schedule_hour: env_parse("SCRAPER_SCHEDULE_HOUR", 3),
            schedule_minute: env_parse("SCRAPER_SCHEDULE_MINUTE", 0),
            enabled: env_parse("SCRAPER_ENABLED", true),
            admin_email: env_string("ADMIN_EMAIL", "admin@localhost"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt_secret: String,
    pub scraper_config: ScraperConfig,
    pub default_storage_location_id: i64,
    pub auth_service: AuthService,
    pub directory_service: DirectoryService,
    pub location_service: LocationService,
    pub equipment_service: EquipmentService,
    pub assignment_service: AssignmentService,
    pub conflict_service: ConflictService,
    pub history_service: HistoryService,
    pub analytics_service: AnalyticsService,
    pub scraper_service: ScraperService,
    pub report_service: ReportService,
}

impl AppState {
    // A assinatura retorna um Result!
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&db_pool).await?;
        tracing::info!("✅ Migrações aplicadas");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let directory_repo = DirectoryRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let equipment_repo = EquipmentRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let history_repo = HistoryRepository::new(db_pool.clone());
        let document_repo = DocumentRepository::new(db_pool.clone());
        let analytics_repo = AnalyticsRepository::new(db_pool.clone());

        // A localização padrão de guarda vem da configuração (não de
        // heurística sobre a primeira linha da tabela) e é criada na
        // subida se ainda não existir.
        let storage_slug = env_string("DEFAULT_STORAGE_LOCATION_SLUG", "main-storage");
        let storage_name = env_string("DEFAULT_STORAGE_LOCATION_NAME", "Main Storage");
        let default_storage_location_id = location_repo
            .ensure_default(&storage_slug, &storage_name)
            .await?;
        tracing::info!(
            "✅ Localização padrão de guarda: '{}' (id {})",
            storage_slug,
            default_storage_location_id
        );

        let scraper_config = ScraperConfig::from_env();

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let directory_service = DirectoryService::new(directory_repo.clone(), user_repo.clone());
        let location_service = LocationService::new(location_repo.clone());
        let equipment_service = EquipmentService::new(
            equipment_repo.clone(),
            history_repo.clone(),
            assignment_repo.clone(),
            location_repo.clone(),
            db_pool.clone(),
        );
        let assignment_service = AssignmentService::new(
            assignment_repo.clone(),
            equipment_repo.clone(),
            directory_repo.clone(),
            user_repo.clone(),
            history_repo.clone(),
            default_storage_location_id,
            db_pool.clone(),
        );
        let conflict_service = ConflictService::new(
            assignment_repo.clone(),
            equipment_repo.clone(),
            default_storage_location_id,
            db_pool.clone(),
        );
        let history_service = HistoryService::new(
            history_repo.clone(),
            equipment_repo.clone(),
            db_pool.clone(),
        );
        let analytics_service = AnalyticsService::new(analytics_repo);
        let scraper_service = ScraperService::new(document_repo, scraper_config.clone())?;
        let report_service = ReportService::new(equipment_repo.clone());

        // Retorna Ok com o estado montado
        Ok(Self {
            db_pool,
            jwt_secret,
            scraper_config,
            default_storage_location_id,
            auth_service,
            directory_service,
            location_service,
            equipment_service,
            assignment_service,
            conflict_service,
            history_service,
            analytics_service,
            scraper_service,
            report_service,
        })
    }
}
