//! Sdílený stav serveru — jedna instance za Arc, handlery si berou reference.

use std::sync::Mutex;
use std::time::Duration;

use api_stats::StatsTracker;
use livescore_client::{LivescoreClient, LivescoreConfig};
use logger::{now_iso, ApiCallEvent, EventLogger};

use crate::config::Config;
use crate::gate::SessionStore;

pub struct AppState {
    pub config:   Config,
    pub client:   LivescoreClient,
    /// Tracker za mutexem — concurrent handlery sdílí read-modify-write-persist
    pub stats:    Mutex<StatsTracker>,
    pub sessions: SessionStore,
    pub events:   EventLogger,
    /// Samostatný klient pro captcha verify POST
    pub http:     reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = LivescoreClient::new(LivescoreConfig {
            base_url:       config.api_base.clone(),
            key:            config.api_key.clone(),
            secret:         config.api_secret.clone(),
            competition_id: config.competition_id.clone(),
            group_id:       config.group_id.clone(),
        });
        let stats = Mutex::new(StatsTracker::new(
            config.stats_file.clone(),
            config.history_intervals,
        ));
        let events = EventLogger::new(config.log_dir.clone());
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            client,
            stats,
            sessions: SessionStore::new(),
            events,
            http,
        }
    }

    /// Zaznamená výsledek jednoho upstream volání do statistik + JSONL auditu.
    pub fn track(&self, endpoint: &str, success: bool, response_time: f64) {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .track_call(success, response_time);

        let _ = self.events.log(&ApiCallEvent {
            ts: now_iso(),
            event: "API_CALL",
            endpoint: endpoint.to_string(),
            ok: success,
            response_time_secs: response_time,
        });
    }

    pub fn dashboard_data(&self) -> api_stats::DashboardData {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_dashboard_data()
    }
}
