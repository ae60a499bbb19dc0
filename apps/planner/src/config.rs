use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::PaperSize;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_OLLAMA_MODEL: &str = "phi3:mini";
const DEFAULT_INSTITUTE_NAME: &str = "Lesson Plan";

/// Application configuration loaded from environment variables.
/// Every setting has a default; startup fails only on values that do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub generate_timeout: Duration,
    /// Running header title used when an export request carries none.
    pub institute_name: String,
    pub paper_size: PaperSize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs: u64 = parse_env("GENERATE_TIMEOUT_SECS", 120)?;
        let max_upload_mb: usize = parse_env("MAX_UPLOAD_MB", 20)?;

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            ollama_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            ollama_model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            generate_timeout: Duration::from_secs(timeout_secs),
            institute_name: env_or("INSTITUTE_NAME", DEFAULT_INSTITUTE_NAME),
            paper_size: PaperSize::from_str(&env_or("PAPER_SIZE", "a4"))
                .map_err(anyhow::Error::msg)
                .context("PAPER_SIZE must be 'a4' or 'letter'")?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            generate_timeout: Duration::from_secs(120),
            institute_name: DEFAULT_INSTITUTE_NAME.to_string(),
            paper_size: PaperSize::A4,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}
