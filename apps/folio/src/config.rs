use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding `index.html` and `assets/`.
    pub site_dir: PathBuf,
    /// URL or path of the content document.
    pub content_source: String,
    /// Optional JSON file overriding the PDF theme.
    pub theme_path: Option<PathBuf>,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            site_dir: PathBuf::from(env_or("SITE_DIR", "site")),
            content_source: env_or("CONTENT_SOURCE", "site/data/content.json"),
            theme_path: std::env::var("THEME_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            fetch_timeout: Duration::from_secs(
                env_or("FETCH_TIMEOUT_SECS", "10")
                    .parse::<u64>()
                    .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }

    pub fn skeleton_path(&self) -> PathBuf {
        self.site_dir.join("index.html")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.site_dir.join("assets")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
