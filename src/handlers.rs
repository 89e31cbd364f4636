// src/handlers.rs

pub mod analytics;
pub mod assignments;
pub mod auth;
pub mod directory;
pub mod documents;
pub mod equipment;
pub mod history;
pub mod locations;
pub mod reports;
