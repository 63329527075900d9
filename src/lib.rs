pub mod auth;
pub mod backup;
pub mod cache;
pub mod config;
pub mod db;
pub mod facade;
pub mod ipc;
pub mod models;
pub mod store;
