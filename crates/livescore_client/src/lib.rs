//! LigaMX Live — Livescore API client
//!
//! Tenký klient nad livescore-api.com pro jednu soutěž (Liga MX).
//! Každé volání: GET s 10s timeoutem → JSON parse → (payload, elapsed sekundy).
//! Žádné retry, žádná cache — chyby řeší handler o vrstvu výš.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LivescoreConfig {
    pub base_url:       String,
    pub key:            String,
    pub secret:         String,
    pub competition_id: String,
    pub group_id:       String,
}

pub struct LivescoreClient {
    client: reqwest::Client,
    cfg:    LivescoreConfig,
}

impl LivescoreClient {
    pub fn new(cfg: LivescoreConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            cfg,
        }
    }

    /// Tabulka soutěže (standings)
    pub async fn standings(&self) -> Result<(Value, f64)> {
        let url = format!(
            "{}/leagues/table.json?competition_id={}&group_id={}&key={}&secret={}",
            self.cfg.base_url,
            self.cfg.competition_id,
            self.cfg.group_id,
            self.cfg.key,
            self.cfg.secret,
        );
        self.get_json(&url, "standings").await
    }

    /// Právě hrané zápasy
    pub async fn livescores(&self) -> Result<(Value, f64)> {
        let url = format!(
            "{}/matches/live.json?competition_id={}&key={}&secret={}",
            self.cfg.base_url, self.cfg.competition_id, self.cfg.key, self.cfg.secret,
        );
        self.get_json(&url, "livescores").await
    }

    /// Rozlosování (nefiltrované — filtr na kolo dělá handler)
    pub async fn fixtures(&self) -> Result<(Value, f64)> {
        let url = format!(
            "{}/fixtures/matches.json?competition_id={}&key={}&secret={}",
            self.cfg.base_url, self.cfg.competition_id, self.cfg.key, self.cfg.secret,
        );
        self.get_json(&url, "fixtures").await
    }

    /// Historie odehraných zápasů; stránkování volitelné
    pub async fn history(&self, page: Option<u32>) -> Result<(Value, f64)> {
        let mut url = format!(
            "{}/scores/history.json?competition_id={}&key={}&secret={}",
            self.cfg.base_url, self.cfg.competition_id, self.cfg.key, self.cfg.secret,
        );
        if let Some(page) = page {
            url.push_str(&format!("&page={page}"));
        }
        self.get_json(&url, "history").await
    }

    /// Nejlepší střelci soutěže
    pub async fn top_scorers(&self) -> Result<(Value, f64)> {
        let url = format!(
            "{}/competitions/topscorers.json?competition_id={}&key={}&secret={}",
            self.cfg.base_url, self.cfg.competition_id, self.cfg.key, self.cfg.secret,
        );
        self.get_json(&url, "top_scorers").await
    }

    async fn get_json(&self, url: &str, endpoint: &str) -> Result<(Value, f64)> {
        let started = Instant::now();

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("{endpoint} request failed"))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .with_context(|| format!("{endpoint} body read failed"))?;
        let elapsed = started.elapsed().as_secs_f64();

        debug!("{endpoint} {status}: {} bytes in {elapsed:.3}s", raw.len());

        let data: Value = serde_json::from_str(&raw)
            .with_context(|| format!("{endpoint} JSON parse failed"))?;

        Ok((data, elapsed))
    }
}
