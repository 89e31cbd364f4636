// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::equipment::create_manufacturer,
        handlers::equipment::list_manufacturers,
        handlers::equipment::delete_manufacturer,
        handlers::equipment::create_equipment_type,
        handlers::equipment::list_equipment_types,
        handlers::equipment::delete_equipment_type,

        // --- Equipment ---
        handlers::equipment::create_item,
        handlers::equipment::search_items,
        handlers::equipment::get_item,
        handlers::equipment::update_item,
        handlers::equipment::delete_item,

        // --- Assignments ---
        handlers::assignments::get_assignment,
        handlers::assignments::assign_item,
        handlers::assignments::unassign_item,
        handlers::assignments::assignment_history,
        handlers::assignments::bulk_assign,
        handlers::assignments::check_conflicts,
        handlers::assignments::validate_assignment,
        handlers::assignments::system_alerts,

        // --- Locations ---
        handlers::locations::list_locations,
        handlers::locations::create_location,
        handlers::locations::update_location,
        handlers::locations::delete_location,

        // --- Directory ---
        handlers::directory::list_teams,
        handlers::directory::create_team,
        handlers::directory::add_team_member,

        // --- History ---
        handlers::history::item_history,
        handlers::history::recent_history,
        handlers::history::clean_history,

        // --- Analytics ---
        handlers::analytics::quantity_recommendations,

        // --- Documents ---
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::list_runs,
        handlers::documents::trigger_scrape,

        // --- Reports ---
        handlers::reports::equipment_report,
    ),
    components(
        schemas(

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Manufacturer,
            models::catalog::EquipmentType,

            // --- Equipment ---
            models::equipment::ItemCondition,
            models::equipment::EquipmentItem,

            // --- Assignments ---
            models::assignment::AssigneeKind,
            models::assignment::AssignmentRecord,
            models::assignment::AssignmentView,
            models::assignment::AssignmentStatus,
            models::assignment::DuplicateTypeEntry,
            models::assignment::DamagedItemEntry,
            models::assignment::ConflictReport,
            models::assignment::ValidationReport,
            models::assignment::AlertKind,
            models::assignment::SystemAlert,

            // --- Locations ---
            models::location::LocationKind,
            models::location::Location,

            // --- Directory ---
            models::directory::Team,
            models::directory::TeamMemberRole,
            models::directory::TeamMember,

            // --- History ---
            models::history::HistoryAction,
            models::history::HistoryEntry,
            models::history::HistoryEntryView,

            // --- Analytics ---
            models::analytics::ConfidenceLevel,
            models::analytics::QuantityRecommendation,

            // --- Documents ---
            models::document::DocumentCategory,
            models::document::Document,
            models::document::ScrapeTrigger,
            models::document::ScrapeStatus,
            models::document::ScrapeRun,
            models::document::ScraperState,
            models::document::Notification,

            // --- Payloads ---
            handlers::equipment::CreateManufacturerPayload,
            handlers::equipment::CreateEquipmentTypePayload,
            handlers::equipment::CreateItemPayload,
            handlers::equipment::UpdateItemPayload,
            handlers::assignments::AssignPayload,
            handlers::assignments::BulkAssignPayload,
            handlers::assignments::BulkFailure,
            handlers::assignments::BulkOutcome,
            handlers::assignments::ValidateAssignmentPayload,
            handlers::locations::CreateLocationPayload,
            handlers::locations::UpdateLocationPayload,
            handlers::directory::CreateTeamPayload,
            handlers::directory::AddTeamMemberPayload,
            handlers::history::CleanHistoryPayload,
            handlers::history::CleanHistoryOutcome,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Catalog", description = "Fabricantes e Tipos de Equipamento"),
        (name = "Equipment", description = "Itens de Equipamento e Identificadores"),
        (name = "Assignments", description = "Empréstimos, Conflitos e Validações"),
        (name = "Locations", description = "Locais de Armazenamento"),
        (name = "Directory", description = "Equipes e Membros"),
        (name = "History", description = "Trilha de Auditoria"),
        (name = "Analytics", description = "Recomendações de Quantidade"),
        (name = "Documents", description = "Documentos Regulatórios (SWE3)"),
        (name = "Reports", description = "Relatórios em PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
