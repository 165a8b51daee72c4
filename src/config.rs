//! Konfigurace přes environment (dotenv načítá main).
//! Klíče a secrety NIKDY v kódu — jen env.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind:                 String,
    pub api_base:             String,
    pub api_key:              String,
    pub api_secret:           String,
    pub competition_id:       String,
    pub group_id:             String,
    /// Kolo, na které se filtruje /api/fixtures
    pub target_round:         String,
    /// Fixní stránka pro /api/history (results má vždy page=1)
    pub history_page:         u32,
    pub recaptcha_secret:     String,
    pub recaptcha_site_key:   String,
    pub recaptcha_verify_url: String,
    pub stats_file:           PathBuf,
    pub history_intervals:    usize,
    pub log_dir:              PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind: env::var("LIGAMX_BIND").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            api_base: env::var("LIVESCORE_API_BASE")
                .unwrap_or_else(|_| "https://livescore-api.com/api-client".into()),
            api_key: env::var("LIVESCORE_API_KEY").context("LIVESCORE_API_KEY not set")?,
            api_secret: env::var("LIVESCORE_API_SECRET")
                .context("LIVESCORE_API_SECRET not set")?,
            competition_id: env::var("LIGAMX_COMPETITION_ID").unwrap_or_else(|_| "45".into()),
            group_id: env::var("LIGAMX_GROUP_ID").unwrap_or_else(|_| "3420".into()),
            target_round: env::var("LIGAMX_TARGET_ROUND").unwrap_or_else(|_| "13".into()),
            history_page: env::var("LIGAMX_HISTORY_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            recaptcha_secret: env::var("RECAPTCHA_SECRET").context("RECAPTCHA_SECRET not set")?,
            recaptcha_site_key: env::var("RECAPTCHA_SITE_KEY").unwrap_or_default(),
            recaptcha_verify_url: env::var("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| "https://www.google.com/recaptcha/api/siteverify".into()),
            stats_file: env::var("LIGAMX_STATS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/api_stats.json")),
            history_intervals: env::var("LIGAMX_HISTORY_INTERVALS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(api_stats::DEFAULT_HISTORY_INTERVALS),
            log_dir: env::var("LIGAMX_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
        })
    }
}
