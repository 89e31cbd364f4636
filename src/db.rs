pub mod user_repo;
pub use user_repo::UserRepository;
pub mod directory_repo;
pub use directory_repo::DirectoryRepository;
pub mod equipment_repo;
pub use equipment_repo::EquipmentRepository;
pub mod assignment_repo;
pub use assignment_repo::AssignmentRepository;
pub mod history_repo;
pub use history_repo::HistoryRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
