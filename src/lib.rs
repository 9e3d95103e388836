mod api;
mod config;
mod database;
mod models;
mod notify;
mod services;
mod web;

pub use api::routes as api_routes;
pub use config::Config;
pub use database::Database;
pub use web::{AppState, routes};
