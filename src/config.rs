use std::env;
use std::path::PathBuf;

/// Environment-sourced settings, read once at startup and passed down
/// through `AppState`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_env: String,
    pub api_v1_prefix: String,
    pub redis_url: Option<String>,
    pub scheduler_timezone: String,
    /// Reserved for reminder dispatch; nothing consumes this yet.
    pub reminder_lead_minutes: i64,
    pub database_path: PathBuf,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Seedr".to_string()),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            api_v1_prefix: env::var("API_V1_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            redis_url: env::var("REDIS_URL").ok(),
            scheduler_timezone: env::var("SCHEDULER_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            reminder_lead_minutes: env::var("REMINDER_LEAD_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("seedr.db")),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}
