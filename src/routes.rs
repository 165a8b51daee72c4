//! HTTP surface — router + jeden handler na capability.
//!
//! Pass-through endpointy vrací upstream envelope beze změny; chyby upstream
//! se NIKDY nepropagují do axum — handler je převede na JSON error envelope
//! s HTTP 500 a zapíše failed call do statistik.

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use logger::{now_iso, VerifyAttemptEvent};

use crate::gate::{self, verification_gate};
use crate::state::AppState;
use crate::templates;
use crate::transform;

pub fn create_router(state: Arc<AppState>) -> Router {
    let gated = Router::new()
        .route("/", get(index_page))
        .nest("/api", api_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verification_gate,
        ));

    Router::new()
        .merge(gated)
        .route("/verify", get(verify_page).post(verify_submit))
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/standings", get(get_standings))
        .route("/livescores", get(get_livescores))
        .route("/fixtures", get(get_fixtures))
        .route("/history", get(get_history))
        .route("/results", get(get_results))
        .route("/metrics", get(get_metrics))
        .route("/dashboard", get(get_dashboard))
}

// ── Pages ────────────────────────────────────────────────────────────────────

async fn index_page() -> Html<String> {
    Html(templates::dashboard_page())
}

async fn verify_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(templates::verify_page(&state.config.recaptcha_site_key, None))
}

#[derive(Debug, Deserialize)]
struct VerifyForm {
    #[serde(rename = "g-recaptcha-response", default)]
    g_recaptcha_response: String,
}

async fn verify_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<VerifyForm>,
) -> Response {
    let ok = !form.g_recaptcha_response.is_empty()
        && gate::check_captcha(&state, &form.g_recaptcha_response).await;

    let _ = state.events.log(&VerifyAttemptEvent {
        ts: now_iso(),
        event: "VERIFY_ATTEMPT",
        ok,
    });

    if ok {
        let id = state.sessions.create_verified().await;
        (
            StatusCode::FOUND,
            [
                (header::SET_COOKIE, gate::session_cookie(&id)),
                (header::LOCATION, "/".to_string()),
            ],
        )
            .into_response()
    } else {
        // VerificationFailed je form error, ne HTTP error status
        Html(templates::verify_page(
            &state.config.recaptcha_site_key,
            Some("Verification failed, please try again."),
        ))
        .into_response()
    }
}

// ── API handlers ─────────────────────────────────────────────────────────────

async fn get_standings(State(state): State<Arc<AppState>>) -> Response {
    match state.client.standings().await {
        Ok((data, elapsed)) => {
            state.track("standings", true, elapsed);
            Json(data).into_response()
        }
        Err(e) => {
            state.track("standings", false, 0.0);
            warn!("standings upstream failed: {e:#}");
            plain_error(&e.to_string())
        }
    }
}

async fn get_livescores(State(state): State<Arc<AppState>>) -> Response {
    match state.client.livescores().await {
        Ok((data, elapsed)) => {
            state.track("livescores", true, elapsed);
            Json(data).into_response()
        }
        Err(e) => {
            state.track("livescores", false, 0.0);
            warn!("livescores upstream failed: {e:#}");
            plain_error(&e.to_string())
        }
    }
}

async fn get_fixtures(State(state): State<Arc<AppState>>) -> Response {
    match state.client.fixtures().await {
        Ok((mut data, elapsed)) => {
            state.track("fixtures", true, elapsed);
            transform::filter_fixtures_by_round(&mut data, &state.config.target_round);
            Json(data).into_response()
        }
        Err(e) => {
            state.track("fixtures", false, 0.0);
            warn!("fixtures upstream failed: {e:#}");
            plain_error(&e.to_string())
        }
    }
}

async fn get_history(State(state): State<Arc<AppState>>) -> Response {
    let page = state.config.history_page;
    match state.client.history(Some(page)).await {
        Ok((data, elapsed)) => {
            state.track("history", true, elapsed);
            Json(data).into_response()
        }
        Err(e) => {
            state.track("history", false, 0.0);
            warn!("history upstream failed: {e:#}");
            plain_error(&e.to_string())
        }
    }
}

async fn get_results(State(state): State<Arc<AppState>>) -> Response {
    match state.client.history(Some(1)).await {
        Ok((data, elapsed)) => {
            state.track("history", true, elapsed);
            Json(data).into_response()
        }
        Err(e) => {
            state.track("history", false, 0.0);
            warn!("results upstream failed: {e:#}");
            wrapped_error(&e.to_string())
        }
    }
}

/// Kombinuje topscorers + tabulku do jednoho metrics pohledu.
async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    let (scorers, elapsed) = match state.client.top_scorers().await {
        Ok(ok) => ok,
        Err(e) => {
            state.track("top_scorers", false, 0.0);
            warn!("top_scorers upstream failed: {e:#}");
            return wrapped_error(&e.to_string());
        }
    };
    state.track("top_scorers", true, elapsed);

    let (standings, elapsed) = match state.client.standings().await {
        Ok(ok) => ok,
        Err(e) => {
            state.track("standings", false, 0.0);
            warn!("standings upstream failed: {e:#}");
            return wrapped_error(&e.to_string());
        }
    };
    state.track("standings", true, elapsed);

    let top_scorers = scorers
        .pointer("/data/topscorers")
        .cloned()
        .unwrap_or_else(|| json!([]));
    let table = standings
        .pointer("/data/table")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Json(json!({
        "success": true,
        "data": {
            "top_scorers": top_scorers,
            "goals_by_team": transform::goals_by_team(&table),
        }
    }))
    .into_response()
}

/// API statistiky trackeru + odhad celkového počtu zápasů ze stránkování.
async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let (page1, elapsed) = match state.client.history(Some(1)).await {
        Ok(ok) => ok,
        Err(e) => {
            state.track("history", false, 0.0);
            warn!("dashboard history upstream failed: {e:#}");
            return wrapped_error(&e.to_string());
        }
    };
    state.track("history", true, elapsed);

    let page1_matches = transform::match_count(&page1);
    let total_pages =
        transform::value_as_u64(page1.pointer("/data/total_pages").unwrap_or(&Value::Null));

    let total_matches = if total_pages > 1 {
        let (last, elapsed) = match state.client.history(Some(total_pages as u32)).await {
            Ok(ok) => ok,
            Err(e) => {
                state.track("history", false, 0.0);
                warn!("dashboard last-page upstream failed: {e:#}");
                return wrapped_error(&e.to_string());
            }
        };
        state.track("history", true, elapsed);
        transform::estimate_total_matches(page1_matches, total_pages, transform::match_count(&last))
    } else {
        page1_matches
    };

    let dash = state.dashboard_data();

    Json(json!({
        "success": true,
        "data": {
            "api_stats": dash.api_stats,
            "api_trend": dash.api_trend,
            "hours": dash.hours,
            "total_matches": total_matches,
        }
    }))
    .into_response()
}

// ── Error envelopes ──────────────────────────────────────────────────────────

fn plain_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": msg })),
    )
        .into_response()
}

fn wrapped_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": msg })),
    )
        .into_response()
}
