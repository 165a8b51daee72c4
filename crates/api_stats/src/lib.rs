//! LigaMX Live — API Stats Tracker
//!
//! Klouzavé statistiky volání upstream API: kumulativní countery + hodinové
//! trend buckety pro dashboard. Stav se po každém zápisu persistuje do JSON
//! souboru a při startu se z něj načítá zpět.
//!
//! Pozor: update_hours() regeneruje jen labely — datová pole se NEposouvají,
//! takže po rotaci může bucket nést data pod novým labelem.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_HISTORY_INTERVALS: usize = 48;

/// Uložený dokument drží jen posledních N časů odpovědí (in-memory roste dál)
const SAVED_RESPONSE_TIMES: usize = 100;

/// Čtyři paralelní pole indexovaná hour-slotem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendHistory {
    pub calls:         Vec<u64>,
    pub success_rate:  Vec<i64>,
    pub response_time: Vec<f64>,
    pub errors:        Vec<u64>,
}

impl TrendHistory {
    fn zeroed(intervals: usize) -> Self {
        Self {
            calls:         vec![0; intervals],
            success_rate:  vec![100; intervals],
            response_time: vec![0.0; intervals],
            errors:        vec![0; intervals],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiStats {
    pub calls:         u64,
    pub success_rate:  f64,
    pub response_time: f64,
    pub errors:        u64,
    pub uptime:        u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub api_stats: ApiStats,
    pub api_trend: TrendHistory,
    pub hours:     Vec<String>,
}

/// On-disk formát; chybějící klíče padají na defaulty
#[derive(Debug, Default, Deserialize)]
struct StatsDocument {
    #[serde(default)]
    api_calls_count: u64,
    #[serde(default)]
    api_errors_count: u64,
    #[serde(default)]
    api_response_times: Vec<f64>,
    #[serde(default)]
    api_start_time: f64,
    #[serde(default)]
    api_history: Option<TrendHistory>,
    #[serde(default)]
    api_hours: Option<Vec<String>>,
}

pub struct StatsTracker {
    intervals:      usize,
    stats_file:     PathBuf,
    calls_count:    u64,
    errors_count:   u64,
    response_times: Vec<f64>,
    start_time:     f64,
    history:        TrendHistory,
    hours:          Vec<String>,
}

impl StatsTracker {
    /// Vytvoří tracker nad daným souborem; existující stav se načte.
    pub fn new(stats_file: impl Into<PathBuf>, intervals: usize) -> Self {
        let stats_file = stats_file.into();
        if let Some(parent) = stats_file.parent() {
            fs::create_dir_all(parent).ok();
        }

        let mut tracker = Self {
            intervals,
            stats_file,
            calls_count: 0,
            errors_count: 0,
            response_times: Vec::new(),
            start_time: epoch_now(),
            history: TrendHistory::zeroed(intervals),
            hours: initialize_hours(intervals),
        };
        tracker.load();
        tracker
    }

    /// Zaznamená jedno upstream volání a uloží stav na disk.
    pub fn track_call(&mut self, success: bool, response_time: f64) {
        self.track_call_at(success, response_time, Local::now());
    }

    fn track_call_at(&mut self, success: bool, response_time: f64, now: DateTime<Local>) {
        self.calls_count += 1;
        self.response_times.push(response_time);
        if !success {
            self.errors_count += 1;
        }

        self.update_hours_at(now);

        let current_label = now.format("%H:%M").to_string();
        let idx = resolve_hour_index(&self.hours, &current_label, self.intervals);

        self.history.calls[idx] += 1;
        if !success {
            self.history.errors[idx] += 1;
        }

        let calls = self.history.calls[idx];
        let errors = self.history.errors[idx];
        self.history.success_rate[idx] = if calls > 0 {
            (((calls - errors) as f64 / calls as f64) * 100.0).round() as i64
        } else {
            100
        };
        // Poslední latence v slotu, ne průměr
        self.history.response_time[idx] = response_time;

        self.save();
    }

    /// Regeneruje labely pokud aktuální "HH:MM" v seznamu chybí.
    /// Datová pole v history zůstávají na místě — labely se jen přemapují.
    pub fn update_hours(&mut self) {
        self.update_hours_at(Local::now());
    }

    fn update_hours_at(&mut self, now: DateTime<Local>) {
        let current_label = now.format("%H:%M").to_string();
        if self.hours.iter().any(|h| h == &current_label) {
            return;
        }
        self.hours = initialize_hours_at(self.intervals, now);
    }

    pub fn get_stats(&self) -> ApiStats {
        let response_time = if self.response_times.is_empty() {
            0.0
        } else {
            self.response_times.iter().sum::<f64>() / self.response_times.len() as f64
        };
        let success_rate = if self.calls_count > 0 {
            100.0 - (self.errors_count as f64 / self.calls_count as f64) * 100.0
        } else {
            100.0
        };

        ApiStats {
            calls: self.calls_count,
            success_rate,
            response_time,
            errors: self.errors_count,
            uptime: (epoch_now() - self.start_time).max(0.0) as u64,
        }
    }

    pub fn get_trend(&self) -> &TrendHistory {
        &self.history
    }

    pub fn get_hours(&self) -> &[String] {
        &self.hours
    }

    pub fn get_dashboard_data(&self) -> DashboardData {
        DashboardData {
            api_stats: self.get_stats(),
            api_trend: self.history.clone(),
            hours: self.hours.clone(),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls_count
    }

    pub fn errors(&self) -> u64 {
        self.errors_count
    }

    pub fn response_times(&self) -> &[f64] {
        &self.response_times
    }

    fn load(&mut self) {
        if !self.stats_file.exists() {
            return;
        }

        let doc: StatsDocument = match fs::read_to_string(&self.stats_file)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from))
        {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to load API stats from {:?}: {e}", self.stats_file);
                return;
            }
        };

        self.calls_count = doc.api_calls_count;
        self.errors_count = doc.api_errors_count.min(doc.api_calls_count);
        self.response_times = doc.api_response_times;
        if doc.api_start_time > 0.0 {
            self.start_time = doc.api_start_time;
        }
        if let Some(history) = doc.api_history {
            if history.calls.len() == self.intervals {
                self.history = history;
            }
        }
        if let Some(hours) = doc.api_hours {
            if hours.len() == self.intervals {
                self.hours = hours;
            }
        }
        self.update_hours();

        info!(
            "API stats loaded: {} calls, {} errors",
            self.calls_count, self.errors_count
        );
    }

    /// Zápis na disk; selhání se jen zaloguje, request kvůli statistikám nepadá.
    pub fn save(&self) {
        if let Err(e) = self.write_document() {
            warn!("Failed to save API stats to {:?}: {e}", self.stats_file);
        }
    }

    fn write_document(&self) -> Result<()> {
        let saved_from = self.response_times.len().saturating_sub(SAVED_RESPONSE_TIMES);
        let doc = json!({
            "api_calls_count": self.calls_count,
            "api_errors_count": self.errors_count,
            "api_response_times": &self.response_times[saved_from..],
            "api_start_time": self.start_time,
            "api_history": &self.history,
            "api_hours": &self.hours,
            "last_updated": Local::now().to_rfc3339(),
        });
        let pretty = serde_json::to_string_pretty(&doc).context("serialize stats")?;
        fs::write(&self.stats_file, pretty).context("write stats file")?;
        Ok(())
    }
}

/// H labelů "HH:MM" — posledních H hodin končících teď, nejstarší první
pub fn initialize_hours(intervals: usize) -> Vec<String> {
    initialize_hours_at(intervals, Local::now())
}

fn initialize_hours_at(intervals: usize, now: DateTime<Local>) -> Vec<String> {
    (0..intervals)
        .rev()
        .map(|i| (now - Duration::hours(i as i64)).format("%H:%M").to_string())
        .collect()
}

/// Exact match má přednost; jinak label s nejbližší minutou dne (strict `<`,
/// tj. při shodě vyhrává první výskyt). Bez labelů padáme na poslední index.
fn resolve_hour_index(hours: &[String], current_label: &str, intervals: usize) -> usize {
    if let Some(idx) = hours.iter().position(|h| h == current_label) {
        return idx;
    }

    let current_minutes = minutes_of_day(current_label);
    let mut idx = intervals.saturating_sub(1);
    let mut min_diff = i64::MAX;
    for (i, label) in hours.iter().enumerate() {
        let diff = (minutes_of_day(label) - current_minutes).abs();
        if diff < min_diff {
            min_diff = diff;
            idx = i;
        }
    }
    idx
}

fn minutes_of_day(label: &str) -> i64 {
    let mut parts = label.splitn(2, ':');
    let hours = parts.next().and_then(|p| p.parse::<i64>().ok()).unwrap_or(0);
    let minutes = parts.next().and_then(|p| p.parse::<i64>().ok()).unwrap_or(0);
    hours * 60 + minutes
}

fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
