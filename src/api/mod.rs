use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::{
    add_team_to_tournament, apply_live_snapshot, complete_tournament, create_pool, get_live_score,
    get_tournament, get_tournament_detail, get_tournament_matches, get_tournament_players,
    get_tournament_teams, init_database_with_pool, list_tournaments, record_match_result,
    start_tournament, update_match_status,
};
use crate::error::FixtureError;
use crate::models::{ApiResponse, LiveScore, Match, MatchStatus, Tournament, TournamentDetail};
use crate::services::{generate_schedule, Fixture, StandingsBoard};

type ApiError = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn serve(database_url: &str, port: u16) -> anyhow::Result<()> {
    let pool = create_pool(database_url).await?;
    init_database_with_pool(&pool).await?;

    let app = create_router().with_state(pool);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("FixtureForge API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router() -> Router<SqlitePool> {
    Router::new()
        .route("/health", get(health_check))
        .route("/tournaments", get(list_tournaments_handler))
        .route("/tournaments/{id}", get(get_tournament_handler))
        .route("/tournaments/{id}/teams", post(register_team_handler))
        .route("/tournaments/{id}/start", post(start_tournament_handler))
        .route("/tournaments/{id}/complete", post(complete_tournament_handler))
        .route("/tournaments/{id}/matches", get(get_matches_handler))
        .route("/tournaments/{id}/standings", get(get_standings_handler))
        .route("/tournaments/{id}/schedule/preview", get(preview_schedule_handler))
        .route("/matches/{id}/live", get(get_live_score_handler).post(push_live_score_handler))
        .route("/matches/{id}/status", post(update_match_status_handler))
        .route("/matches/{id}/result", post(record_result_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

fn status_for(err: &FixtureError) -> StatusCode {
    match err {
        FixtureError::TournamentNotFound(_) | FixtureError::MatchNotFound(_) => StatusCode::NOT_FOUND,
        FixtureError::InvalidTournamentTransition { .. }
        | FixtureError::InvalidMatchTransition { .. }
        | FixtureError::PartialPersistence { .. }
        | FixtureError::StaleStatus { .. } => StatusCode::CONFLICT,
        FixtureError::InvalidInput(_) | FixtureError::UnsupportedFormat(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FixtureError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(context: &str, err: FixtureError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("{}: {}", context, err);
    } else {
        tracing::warn!("{}: {}", context, err);
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

async fn require_tournament(pool: &SqlitePool, tournament_id: &str) -> Result<Tournament, ApiError> {
    match get_tournament(pool, tournament_id).await {
        Ok(Some(t)) => Ok(t),
        Ok(None) => Err(not_found("tournament", tournament_id)),
        Err(e) => Err(api_error("Failed to fetch tournament", e)),
    }
}

fn not_found(what: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("{} not found: {}", what, id))),
    )
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("FixtureForge API is running"))
}

// GET /tournaments
async fn list_tournaments_handler(State(pool): State<SqlitePool>) -> ApiResult<Vec<Tournament>> {
    list_tournaments(&pool)
        .await
        .map(|t| Json(ApiResponse::success(t)))
        .map_err(|e| api_error("Failed to list tournaments", e))
}

// GET /tournaments/{id} - tournament with its teams and matches
async fn get_tournament_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<TournamentDetail> {
    match get_tournament_detail(&pool, &tournament_id).await {
        Ok(Some(detail)) => Ok(Json(ApiResponse::success(detail))),
        Ok(None) => Err(not_found("tournament", &tournament_id)),
        Err(e) => Err(api_error("Failed to fetch tournament", e)),
    }
}

#[derive(Deserialize)]
struct RegisterTeamRequest {
    team_id: String,
}

// POST /tournaments/{id}/teams
async fn register_team_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
    Json(request): Json<RegisterTeamRequest>,
) -> ApiResult<String> {
    add_team_to_tournament(&pool, &tournament_id, &request.team_id)
        .await
        .map(|()| Json(ApiResponse::success(format!("Team {} registered", request.team_id))))
        .map_err(|e| api_error("Failed to register team", e))
}

// POST /tournaments/{id}/start - generate fixtures and go IN_PROGRESS
async fn start_tournament_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Vec<Match>> {
    start_tournament(&pool, &tournament_id)
        .await
        .map(|matches| Json(ApiResponse::success(matches)))
        .map_err(|e| api_error("Failed to start tournament", e))
}

// POST /tournaments/{id}/complete
async fn complete_tournament_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Tournament> {
    complete_tournament(&pool, &tournament_id)
        .await
        .map(|t| Json(ApiResponse::success(t)))
        .map_err(|e| api_error("Failed to complete tournament", e))
}

// GET /tournaments/{id}/matches
async fn get_matches_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Vec<Match>> {
    require_tournament(&pool, &tournament_id).await?;
    get_tournament_matches(&pool, &tournament_id)
        .await
        .map(|matches| Json(ApiResponse::success(matches)))
        .map_err(|e| api_error("Failed to fetch matches", e))
}

// GET /tournaments/{id}/standings - recomputed on every request
async fn get_standings_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<StandingsBoard> {
    require_tournament(&pool, &tournament_id).await?;
    let teams = get_tournament_teams(&pool, &tournament_id)
        .await
        .map_err(|e| api_error("Failed to fetch teams", e))?;
    let players = get_tournament_players(&pool, &tournament_id)
        .await
        .map_err(|e| api_error("Failed to fetch players", e))?;

    Ok(Json(ApiResponse::success(StandingsBoard::compute(&teams, &players))))
}

#[derive(Serialize, Deserialize)]
pub struct SchedulePreview {
    pub tournament_id: String,
    pub fixtures: Vec<Fixture>,
}

// GET /tournaments/{id}/schedule/preview - generator output, nothing written
async fn preview_schedule_handler(
    State(pool): State<SqlitePool>,
    Path(tournament_id): Path<String>,
) -> ApiResult<SchedulePreview> {
    let tournament = require_tournament(&pool, &tournament_id).await?;
    let teams = get_tournament_teams(&pool, &tournament_id)
        .await
        .map_err(|e| api_error("Failed to fetch teams", e))?;

    let fixtures = generate_schedule(tournament.format, &teams, &tournament.venue)
        .map_err(|e| api_error("Failed to preview schedule", e))?;

    Ok(Json(ApiResponse::success(SchedulePreview {
        tournament_id,
        fixtures,
    })))
}

// GET /matches/{id}/live
async fn get_live_score_handler(
    State(pool): State<SqlitePool>,
    Path(match_id): Path<String>,
) -> ApiResult<LiveScore> {
    match get_live_score(&pool, &match_id).await {
        Ok(Some(live)) => Ok(Json(ApiResponse::success(live))),
        Ok(None) => Err(not_found("match", &match_id)),
        Err(e) => Err(api_error("Failed to fetch live score", e)),
    }
}

// POST /matches/{id}/live - replace the scoreboard with a pushed snapshot
async fn push_live_score_handler(
    State(pool): State<SqlitePool>,
    Path(match_id): Path<String>,
    Json(snapshot): Json<serde_json::Value>,
) -> ApiResult<LiveScore> {
    apply_live_snapshot(&pool, &match_id, &snapshot)
        .await
        .map(|live| Json(ApiResponse::success(live)))
        .map_err(|e| api_error("Failed to apply live snapshot", e))
}

#[derive(Deserialize)]
struct MatchStatusRequest {
    status: MatchStatus,
}

// POST /matches/{id}/status
async fn update_match_status_handler(
    State(pool): State<SqlitePool>,
    Path(match_id): Path<String>,
    Json(request): Json<MatchStatusRequest>,
) -> ApiResult<Match> {
    update_match_status(&pool, &match_id, request.status)
        .await
        .map(|m| Json(ApiResponse::success(m)))
        .map_err(|e| api_error("Failed to update match status", e))
}

#[derive(Deserialize)]
struct MatchResultRequest {
    home_score: u32,
    away_score: u32,
}

// POST /matches/{id}/result
async fn record_result_handler(
    State(pool): State<SqlitePool>,
    Path(match_id): Path<String>,
    Json(request): Json<MatchResultRequest>,
) -> ApiResult<Match> {
    record_match_result(&pool, &match_id, request.home_score, request.away_score)
        .await
        .map(|m| Json(ApiResponse::success(m)))
        .map_err(|e| api_error("Failed to record result", e))
}
