// tests/common/mod.rs
//
// Fixture compartilhada: banco SQLite em memória com uma única conexão
// (o pool inteiro enxerga o mesmo banco), migrações aplicadas e os
// serviços montados como em produção.
#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use backend_clubgear::db::{
    AnalyticsRepository, AssignmentRepository, DirectoryRepository, EquipmentRepository,
    HistoryRepository, LocationRepository, UserRepository,
};
use backend_clubgear::models::auth::{User, UserRole};
use backend_clubgear::models::catalog::{EquipmentType, Manufacturer};
use backend_clubgear::models::equipment::EquipmentItem;
use backend_clubgear::services::equipment_service::NewItemInput;
use backend_clubgear::services::{
    AnalyticsService, AssignmentService, ConflictService, DirectoryService, EquipmentService,
    HistoryService, LocationService,
};

pub struct TestContext {
    pub pool: SqlitePool,
    pub default_location_id: i64,
    pub admin: User,
    pub equipment: EquipmentService,
    pub assignments: AssignmentService,
    pub conflicts: ConflictService,
    pub history: HistoryService,
    pub analytics: AnalyticsService,
    pub locations: LocationService,
    pub directory: DirectoryService,
    pub users: UserRepository,
    pub assignment_repo: AssignmentRepository,
    pub history_repo: HistoryRepository,
    pub location_repo: LocationRepository,
}

pub async fn setup() -> TestContext {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    let user_repo = UserRepository::new(pool.clone());
    let directory_repo = DirectoryRepository::new(pool.clone());
    let equipment_repo = EquipmentRepository::new(pool.clone());
    let assignment_repo = AssignmentRepository::new(pool.clone());
    let history_repo = HistoryRepository::new(pool.clone());
    let location_repo = LocationRepository::new(pool.clone());
    let analytics_repo = AnalyticsRepository::new(pool.clone());

    let default_location_id = location_repo
        .ensure_default("main-storage", "Main Storage")
        .await
        .expect("default storage location");

    let admin = user_repo
        .create_user(&pool, "admin@club.test", "not-a-real-hash", "Admin", UserRole::Admin)
        .await
        .expect("admin user");

    TestContext {
        equipment: EquipmentService::new(
            equipment_repo.clone(),
            history_repo.clone(),
            assignment_repo.clone(),
            location_repo.clone(),
            pool.clone(),
        ),
        assignments: AssignmentService::new(
            assignment_repo.clone(),
            equipment_repo.clone(),
            directory_repo.clone(),
            user_repo.clone(),
            history_repo.clone(),
            default_location_id,
            pool.clone(),
        ),
        conflicts: ConflictService::new(
            assignment_repo.clone(),
            equipment_repo.clone(),
            default_location_id,
            pool.clone(),
        ),
        history: HistoryService::new(history_repo.clone(), equipment_repo.clone(), pool.clone()),
        analytics: AnalyticsService::new(analytics_repo),
        locations: LocationService::new(location_repo.clone()),
        directory: DirectoryService::new(directory_repo, user_repo.clone()),
        users: user_repo,
        assignment_repo,
        history_repo,
        location_repo,
        default_location_id,
        admin,
        pool,
    }
}

pub async fn seed_catalog(ctx: &TestContext) -> (Manufacturer, EquipmentType) {
    let manufacturer = ctx
        .equipment
        .create_manufacturer("Riddell", None)
        .await
        .expect("manufacturer");
    let equipment_type = ctx.equipment.create_type("Helmet", None).await.expect("equipment type");
    (manufacturer, equipment_type)
}

pub async fn quick_item(
    ctx: &TestContext,
    title: &str,
    manufacturer_id: i64,
    equipment_type_id: i64,
) -> EquipmentItem {
    ctx.equipment
        .create_item(
            &ctx.pool,
            ctx.admin.id,
            NewItemInput {
                title: title.to_string(),
                manufacturer_id,
                equipment_type_id,
                identifier: None,
                size: None,
                condition: None,
                location_id: None,
                metadata: None,
                notes: None,
            },
        )
        .await
        .expect("equipment item")
}

pub async fn member_user(ctx: &TestContext, email: &str, name: &str) -> User {
    ctx.users
        .create_user(&ctx.pool, email, "not-a-real-hash", name, UserRole::Member)
        .await
        .expect("member user")
}
