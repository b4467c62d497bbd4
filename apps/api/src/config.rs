use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::render::PageSize;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of all persisted state: `users.json`, per-user documents and assets.
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_hours: i64,
    /// When set, `save` refuses a document whose validation report fails.
    pub enforce_validation: bool,
    pub pdf_page_size: PageSize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            session_ttl_hours: env_or("SESSION_TTL_HOURS", "24")
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .context("SESSION_TTL_HOURS must be a positive whole number")?,
            enforce_validation: parse_bool(&env_or("ENFORCE_VALIDATION", "false"))
                .context("ENFORCE_VALIDATION must be true or false")?,
            pdf_page_size: env_or("PDF_PAGE_SIZE", "a4")
                .parse::<PageSize>()
                .context("PDF_PAGE_SIZE must be 'a4' or 'letter'")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
