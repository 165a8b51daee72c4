//! Access gate — reCAPTCHA verified session před veškerým obsahem.
//!
//! Dva stavy: Unverified → Verified (úspěšná captcha). Flag žije v session
//! cookie s TTL 1 den; žádný logout, expirace čistě přes TTL.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "ligamx_session";
const SESSION_TTL_HOURS: i64 = 24;

/// session id → expiry; lazy eviction při lookupu
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Založí Verified session a vrátí její id.
    pub async fn create_verified(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let expires = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        self.inner.write().await.insert(id.clone(), expires);
        id
    }

    pub async fn is_verified(&self, id: &str) -> bool {
        let now = Utc::now();
        {
            let sessions = self.inner.read().await;
            match sessions.get(id) {
                Some(expires) if *expires > now => return true,
                None => return false,
                Some(_) => {}
            }
        }
        self.inner.write().await.remove(id);
        false
    }
}

/// Middleware nad content routes: bez Verified session → redirect na /verify.
pub async fn verification_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let cookies = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok());

    let verified = match session_id_from_cookies(cookies) {
        Some(id) => state.sessions.is_verified(&id).await,
        None => false,
    };

    if verified {
        next.run(request).await
    } else {
        Redirect::to("/verify").into_response()
    }
}

fn session_id_from_cookies(cookies: Option<&str>) -> Option<String> {
    for pair in cookies?.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Max-Age=86400; Path=/; HttpOnly")
}

/// Pošle captcha token na verify endpoint. Síťová chyba == neověřeno,
/// uživatel dostane form error, žádný 500.
pub async fn check_captcha(state: &AppState, token: &str) -> bool {
    let params = [
        ("secret", state.config.recaptcha_secret.as_str()),
        ("response", token),
    ];

    match state
        .http
        .post(&state.config.recaptcha_verify_url)
        .form(&params)
        .send()
        .await
    {
        Ok(resp) => match resp.json::<serde_json::Value>().await {
            Ok(body) => body["success"].as_bool().unwrap_or(false),
            Err(e) => {
                warn!("captcha verify parse failed: {e}");
                false
            }
        },
        Err(e) => {
            warn!("captcha verify request failed: {e}");
            false
        }
    }
}
