pub mod auth;
pub mod backup;
pub mod core;
pub mod library;
pub mod payments;
pub mod progress;
pub mod settings;
pub mod students;
