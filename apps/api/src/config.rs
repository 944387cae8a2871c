use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::autosave::DEFAULT_DELAY;
use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::mailer::{DEFAULT_EMAIL_API_URL, DEFAULT_FROM};

/// Application configuration loaded from environment variables.
///
/// API keys are optional at startup: the endpoints that need them fail with a
/// missing-configuration error when invoked without them.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub autosave_dir: PathBuf,
    pub autosave_delay: Duration,
    pub email_api_url: String,
    pub email_api_key: Option<String>,
    pub email_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: env_or("OPENAI_API_URL", DEFAULT_API_URL),
            openai_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            autosave_dir: PathBuf::from(env_or("AUTOSAVE_DIR", "./data")),
            autosave_delay: match optional_env("AUTOSAVE_DELAY_MS") {
                Some(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .context("AUTOSAVE_DELAY_MS must be a whole number of milliseconds")?,
                ),
                None => DEFAULT_DELAY,
            },
            email_api_url: env_or("EMAIL_API_URL", DEFAULT_EMAIL_API_URL),
            email_api_key: optional_env("EMAIL_API_KEY"),
            email_from: env_or("EMAIL_FROM", DEFAULT_FROM),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank both count as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
