pub mod analytics;
pub mod assignment;
pub mod auth;
pub mod catalog;
pub mod directory;
pub mod document;
pub mod equipment;
pub mod history;
pub mod location;
