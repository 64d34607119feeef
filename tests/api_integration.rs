//! HTTP tests against the router with a seeded in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt; // For `oneshot`

use fixtureforge::api::create_router;
use fixtureforge::db::{init_database, list_tournaments, seed_data};
use fixtureforge::models::TournamentFormat;

async fn setup() -> (Router, SqlitePool) {
    let pool = init_database("sqlite::memory:").await.unwrap();
    seed_data(&pool).await.unwrap();
    (create_router().with_state(pool.clone()), pool)
}

async fn tournament_id(pool: &SqlitePool, format: TournamentFormat) -> String {
    list_tournaments(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|t| t.format == format)
        .map(|t| t.id)
        .unwrap()
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => request.body(Body::from(json.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_running() {
    let (app, _pool) = setup().await;
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn standings_rank_seeded_league() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::League).await;

    let (status, body) = call(&app, "GET", &format!("/tournaments/{}/standings", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let board = &body["data"];
    // Rovers and United are level on points; Rovers have the better goal difference.
    assert_eq!(board["teams"][0]["team_name"], "Riverside Rovers");
    assert_eq!(board["teams"][1]["team_name"], "Hilltop United");
    // Two forwards on four goals: the one with more assists goes first.
    assert_eq!(board["top_scorers"][0]["player_name"], "Dev Patel");
    // Equal clean sheets, more saves wins.
    assert_eq!(board["goalkeepers"][0]["player_name"], "Marek Nowak");
}

#[tokio::test]
async fn preview_does_not_write() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::Knockout).await;

    let (status, body) = call(&app, "GET", &format!("/tournaments/{}/schedule/preview", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fixtures"].as_array().map(Vec::len), Some(4));

    let (_, matches) = call(&app, "GET", &format!("/tournaments/{}/matches", id), None).await;
    assert_eq!(matches["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn start_then_restart_conflicts() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::League).await;

    let (status, body) = call(&app, "POST", &format!("/tournaments/{}/start", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["data"][0]["status"], "SCHEDULED");

    let (status, body) = call(&app, "POST", &format!("/tournaments/{}/start", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn mixed_format_start_is_unprocessable() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::Mixed).await;

    let (status, body) = call(&app, "POST", &format!("/tournaments/{}/start", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap_or_default().contains("MIXED"));
}

#[tokio::test]
async fn live_score_round_trip_through_http() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::Knockout).await;

    let (_, started) = call(&app, "POST", &format!("/tournaments/{}/start", id), None).await;
    let match_id = started["data"][0]["id"].as_str().unwrap().to_string();

    let snapshot = serde_json::json!({ "status": "IN_PROGRESS", "home_score": 45, "home_wickets": 1 });
    let (status, _) = call(&app, "POST", &format!("/matches/{}/live", match_id), Some(snapshot)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", &format!("/matches/{}/live", match_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["home"]["score"], 45);
    assert_eq!(body["data"]["away"]["score"], 0);
    assert_eq!(body["data"]["status"], "IN_PROGRESS");

    let result = serde_json::json!({ "home_score": 160, "away_score": 152 });
    let (status, body) = call(&app, "POST", &format!("/matches/{}/result", match_id), Some(result)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "COMPLETED");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (app, _pool) = setup().await;
    let (status, _) = call(&app, "GET", "/tournaments/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/matches/missing/live", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/tournaments/missing/matches", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, "GET", "/tournaments/missing/standings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn live_push_cannot_complete_a_match() {
    let (app, pool) = setup().await;
    let id = tournament_id(&pool, TournamentFormat::League).await;

    let (_, started) = call(&app, "POST", &format!("/tournaments/{}/start", id), None).await;
    let match_id = started["data"][0]["id"].as_str().unwrap().to_string();

    let live = serde_json::json!({ "status": "IN_PROGRESS" });
    call(&app, "POST", &format!("/matches/{}/live", match_id), Some(live)).await;

    let finished = serde_json::json!({ "status": "COMPLETED", "home_score": 2 });
    let (status, _) = call(&app, "POST", &format!("/matches/{}/live", match_id), Some(finished)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = call(&app, "GET", &format!("/matches/{}/live", match_id), None).await;
    assert_eq!(body["data"]["status"], "IN_PROGRESS");
}
