pub mod admin;
pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod feed;
pub mod interactions;
pub mod notifications;
pub mod profiles;
pub mod telemetry;
pub mod utils;
