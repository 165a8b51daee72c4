/// LigaMX Live — Logger
/// JSONL audit stream, jeden soubor na den

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ApiCallEvent {
    pub ts:                  String,
    pub event:               &'static str,   // "API_CALL"
    pub endpoint:            String,         // "standings" | "livescores" | ...
    pub ok:                  bool,
    pub response_time_secs:  f64,            // 0.0 při selhání
}

#[derive(Serialize, Debug)]
pub struct VerifyAttemptEvent {
    pub ts:    String,
    pub event: &'static str,   // "VERIFY_ATTEMPT"
    pub ok:    bool,
}
