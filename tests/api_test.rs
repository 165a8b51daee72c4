//! End-to-end testy: reálný server + mock upstream, oba na ephemeral portech.

use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use ligamx_live::{config::Config, routes, state::AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

// ── Mock upstream ────────────────────────────────────────────────────────────

async fn history_mock(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("page").map(String::as_str) {
        Some("1") | None => Json(json!({
            "success": true,
            "data": {
                "match": [{ "id": "1" }, { "id": "2" }, { "id": "3" }],
                "total_pages": 3
            }
        })),
        _ => Json(json!({
            "success": true,
            "data": { "match": [{ "id": "4" }, { "id": "5" }] }
        })),
    }
}

fn mock_upstream() -> Router {
    Router::new()
        .route(
            "/api-client/leagues/table.json",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "table": [
                        { "name": "América",   "rank": "1", "goals_scored": "15", "goals_conceded": "12" },
                        { "name": "Toluca",    "rank": "2", "goals_scored": "20", "goals_conceded": "10" },
                        { "name": "Cruz Azul", "rank": "3", "goals_scored": "20", "goals_conceded": "8" },
                    ]}
                }))
            }),
        )
        .route(
            "/api-client/matches/live.json",
            get(|| async { Json(json!({ "success": true, "data": { "match": [] } })) }),
        )
        .route(
            "/api-client/fixtures/matches.json",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "fixtures": [
                        { "id": "1", "round": "13", "home_name": "León" },
                        { "id": "2", "round": "14", "home_name": "Pumas" },
                        { "id": "3", "round": "13", "home_name": "Tigres" },
                    ]}
                }))
            }),
        )
        .route("/api-client/scores/history.json", get(history_mock))
        .route(
            "/api-client/competitions/topscorers.json",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": { "topscorers": [
                        { "name": "H. Martínez", "goals": "10" },
                        { "name": "J. Quiñones", "goals": "8" },
                    ]}
                }))
            }),
        )
        .route(
            "/recaptcha/api/siteverify",
            post(|| async { Json(json!({ "success": true })) }),
        )
}

// ── Harness ──────────────────────────────────────────────────────────────────

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn test_config(upstream: &str, dir: &TempDir) -> Config {
    Config {
        bind: "127.0.0.1:0".into(),
        api_base: format!("{upstream}/api-client"),
        api_key: "test-key".into(),
        api_secret: "test-secret".into(),
        competition_id: "45".into(),
        group_id: "3420".into(),
        target_round: "13".into(),
        history_page: 2,
        recaptcha_secret: "test-captcha-secret".into(),
        recaptcha_site_key: String::new(),
        recaptcha_verify_url: format!("{upstream}/recaptcha/api/siteverify"),
        stats_file: dir.path().join("api_stats.json"),
        history_intervals: 48,
        log_dir: dir.path().join("logs"),
    }
}

async fn spawn_app(config: Config) -> String {
    let state = Arc::new(AppState::new(config));
    spawn(routes::create_router(state)).await
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Projde verify flow a vrátí "ligamx_session=<id>" pro Cookie header.
async fn verified_session(client: &reqwest::Client, app: &str) -> String {
    let resp = client
        .post(format!("{app}/verify"))
        .form(&[("g-recaptcha-response", "test-token")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap(), "/");

    let cookie = resp
        .headers()
        .get("set-cookie")
        .expect("verify must set session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

// ── Testy ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unverified_requests_redirect_to_verify() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();

    for path in ["/", "/api/standings", "/api/dashboard"] {
        let resp = client.get(format!("{app}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(resp.headers().get("location").unwrap(), "/verify");
    }

    // verify stránka sama gated není
    let resp = client.get(format!("{app}/verify")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn verify_flow_unlocks_content() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();

    let session = verified_session(&client, &app).await;

    let resp = client
        .get(format!("{app}/api/standings"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["table"].is_array());

    let resp = client
        .get(format!("{app}/"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("<!DOCTYPE html>"));
}

#[tokio::test]
async fn failed_captcha_rerenders_form_without_cookie() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let mut config = test_config(&upstream, &dir);
    // verify endpoint vracející 404 → check selže, ale žádný 500
    config.recaptcha_verify_url = format!("{upstream}/missing/siteverify");
    let app = spawn_app(config).await;
    let client = no_redirect_client();

    let resp = client
        .post(format!("{app}/verify"))
        .form(&[("g-recaptcha-response", "whatever")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_none());
    assert!(resp.text().await.unwrap().contains("Verification failed"));
}

#[tokio::test]
async fn fixtures_are_filtered_by_target_round() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();
    let session = verified_session(&client, &app).await;

    let body: Value = client
        .get(format!("{app}/api/fixtures"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let fixtures = body["data"]["fixtures"].as_array().unwrap();
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[0]["id"], "1");
    assert_eq!(fixtures[1]["id"], "3");
}

#[tokio::test]
async fn metrics_combines_scorers_and_goal_table() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();
    let session = verified_session(&client, &app).await;

    let body: Value = client
        .get(format!("{app}/api/metrics"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["top_scorers"].as_array().unwrap().len(), 2);

    let goals = body["data"]["goals_by_team"].as_array().unwrap();
    assert_eq!(goals[0]["team"], "Toluca");
    assert_eq!(goals[1]["team"], "Cruz Azul");
    assert_eq!(goals[2]["team"], "América");
}

#[tokio::test]
async fn dashboard_estimates_total_matches_and_reports_stats() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();
    let session = verified_session(&client, &app).await;

    let body: Value = client
        .get(format!("{app}/api/dashboard"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    // (3-1)*3 + 2 = 8
    assert_eq!(body["data"]["total_matches"], 8);
    assert!(body["data"]["api_stats"]["calls"].as_u64().unwrap() >= 2);
    assert_eq!(body["data"]["api_stats"]["errors"], 0);
    assert_eq!(body["data"]["hours"].as_array().unwrap().len(), 48);
    assert_eq!(body["data"]["api_trend"]["calls"].as_array().unwrap().len(), 48);
}

#[tokio::test]
async fn upstream_failure_yields_500_and_records_error() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let mut config = test_config(&upstream, &dir);
    // sports endpointy vedou do prázdna (404, prázdné tělo → parse error),
    // captcha verify zůstává funkční
    config.api_base = format!("{upstream}/missing");
    let stats_file: PathBuf = config.stats_file.clone();
    let app = spawn_app(config).await;
    let client = no_redirect_client();
    let session = verified_session(&client, &app).await;

    let resp = client
        .get(format!("{app}/api/standings"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .get(format!("{app}/api/dashboard"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    // failed cally dorazily do persistovaných statistik
    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(&stats_file).unwrap()).unwrap();
    let calls = saved["api_calls_count"].as_u64().unwrap();
    let errors = saved["api_errors_count"].as_u64().unwrap();
    assert!(errors >= 2);
    assert!(errors <= calls);
}

#[tokio::test]
async fn history_and_results_pass_upstream_envelope_through() {
    let dir = TempDir::new().unwrap();
    let upstream = spawn(mock_upstream()).await;
    let app = spawn_app(test_config(&upstream, &dir)).await;
    let client = no_redirect_client();
    let session = verified_session(&client, &app).await;

    // /api/results jde vždy na page=1
    let body: Value = client
        .get(format!("{app}/api/results"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["match"].as_array().unwrap().len(), 3);

    // /api/history jde na fixní stránku (2) → mock vrací 2 zápasy
    let body: Value = client
        .get(format!("{app}/api/history"))
        .header("Cookie", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["match"].as_array().unwrap().len(), 2);
}
