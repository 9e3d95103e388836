//! Configuration Management
//!
//! Provides application configuration as a singleton using `OnceLock`.
//! Configuration values are read from environment variables with sensible defaults.
//!
//! ## Configuration Variables
//!
//! - `DATABASE_URL`: Path to SQLite database file (default: `storefront.db`)
//! - `BIND_ADDRESS`: HTTP server bind address (default: `0.0.0.0:3000`)
//! - `SITE_NAME`: Display name used in page titles and emails
//! - `FROM_EMAIL`: Sender address for outbound notifications
//! - `ADMIN_EMAIL`: Recipient for new-RFQ alerts (unset disables them)

use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub site_name: String,
    pub from_email: String,
    pub admin_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "storefront.db".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            site_name: "Storefront".to_string(),
            from_email: "noreply@storefront.local".to_string(),
            admin_email: None,
        }
    }
}

impl Config {
    /// Initialize the global config (can only be called once)
    pub fn init() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }

    fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            site_name: std::env::var("SITE_NAME").unwrap_or(defaults.site_name),
            from_email: std::env::var("FROM_EMAIL").unwrap_or(defaults.from_email),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
        }
    }
}
