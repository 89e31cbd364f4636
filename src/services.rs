pub mod auth;
pub use auth::AuthService;
pub mod directory_service;
pub use directory_service::DirectoryService;
pub mod location_service;
pub use location_service::LocationService;
pub mod equipment_service;
pub use equipment_service::EquipmentService;
pub mod assignment_service;
pub use assignment_service::AssignmentService;
pub mod conflict_service;
pub use conflict_service::ConflictService;
pub mod history_service;
pub use history_service::HistoryService;
pub mod analytics_service;
pub use analytics_service::AnalyticsService;
pub mod scrape_parser;
pub mod scraper_service;
pub use scraper_service::ScraperService;
pub mod report_service;
pub use report_service::ReportService;
