use anyhow::{Context, Result};

pub const DEFAULT_LLM_API_URL: &str = "https://api.a4f.co/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "provider-3/gpt-4";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → records are kept in memory for the lifetime of the process.
    pub database_url: Option<String>,
    /// Absent → suggestion requests fail with a 500.
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            llm_api_key: optional_env("A4F_API_KEY"),
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
