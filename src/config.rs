use crate::workers::DEFAULT_SCHEDULE;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub generation_schedule: String,
    pub generate_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let generation_schedule = std::env::var("GENERATION_SCHEDULE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());

        let generate_on_startup = std::env::var("GENERATE_ON_STARTUP")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            log_level,
            generation_schedule,
            generate_on_startup,
        }
    }
}
