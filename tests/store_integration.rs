//! Store-level tests: tournament start atomicity, results and live scores.

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use fixtureforge::db::{
    add_team_to_tournament, apply_live_snapshot, complete_tournament, get_live_score,
    get_tournament, get_tournament_matches, get_tournament_players, get_tournament_teams,
    init_database, insert_team, insert_tournament, record_match_result, start_tournament,
    update_match_status,
};
use fixtureforge::models::{
    MatchStatus, Player, PlayerRole, PlayerStats, Sport, Team, TeamStats, Tournament,
    TournamentFormat, TournamentStatus,
};
use fixtureforge::FixtureError;

async fn setup() -> SqlitePool {
    init_database("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

fn team(id: &str, sport: Sport) -> Team {
    let role = match sport {
        Sport::Football => PlayerRole::Goalkeeper,
        Sport::Cricket => PlayerRole::WicketKeeper,
    };
    Team {
        id: id.to_string(),
        name: format!("Team {}", id),
        sport,
        players: vec![Player {
            id: format!("{}-p1", id),
            name: format!("Player {}", id),
            team_id: id.to_string(),
            role,
            stats: PlayerStats::default(),
        }],
        stats: TeamStats::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn create_tournament(
    pool: &SqlitePool,
    id: &str,
    sport: Sport,
    format: TournamentFormat,
    team_count: usize,
) -> Tournament {
    let mut team_ids = Vec::new();
    for i in 0..team_count {
        let team = team(&format!("{}-t{}", id, i), sport);
        insert_team(pool, &team).await.unwrap();
        team_ids.push(team.id);
    }

    let tournament = Tournament {
        id: id.to_string(),
        name: format!("Cup {}", id),
        sport,
        format,
        status: TournamentStatus::Upcoming,
        max_teams: 16,
        current_round: 0,
        team_ids,
        rules: None,
        prize_pool: None,
        venue: "Main Ground".to_string(),
        organizer: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    insert_tournament(pool, &tournament).await.unwrap();
    tournament
}

#[tokio::test]
async fn start_writes_matches_and_status_together() {
    let pool = setup().await;
    create_tournament(&pool, "ko", Sport::Cricket, TournamentFormat::Knockout, 5).await;

    let matches = start_tournament(&pool, "ko").await.unwrap();
    assert_eq!(matches.len(), 4);

    let stored = get_tournament_matches(&pool, "ko").await.unwrap();
    let sequences: Vec<u32> = stored.iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert!(stored.iter().all(|m| m.status == MatchStatus::Scheduled && m.venue == "Main Ground"));

    let tournament = get_tournament(&pool, "ko").await.unwrap().unwrap();
    assert_eq!(tournament.status, TournamentStatus::InProgress);
    assert_eq!(tournament.current_round, 1);
}

#[tokio::test]
async fn starting_twice_is_rejected_without_duplicating_matches() {
    let pool = setup().await;
    create_tournament(&pool, "lg", Sport::Football, TournamentFormat::League, 4).await;

    start_tournament(&pool, "lg").await.unwrap();
    let err = start_tournament(&pool, "lg").await.unwrap_err();
    assert!(matches!(err, FixtureError::InvalidTournamentTransition { .. }));

    assert_eq!(get_tournament_matches(&pool, "lg").await.unwrap().len(), 6);
}

#[tokio::test]
async fn failed_status_write_rolls_back_the_match_list() {
    let pool = setup().await;
    create_tournament(&pool, "rb", Sport::Football, TournamentFormat::League, 3).await;

    sqlx::query(
        r#"
        CREATE TRIGGER refuse_status BEFORE UPDATE OF status ON tournaments
        BEGIN
            SELECT RAISE(ABORT, 'status write refused');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = start_tournament(&pool, "rb").await.unwrap_err();
    assert!(matches!(err, FixtureError::Database(_)));

    assert!(get_tournament_matches(&pool, "rb").await.unwrap().is_empty());
    let tournament = get_tournament(&pool, "rb").await.unwrap().unwrap();
    assert_eq!(tournament.status, TournamentStatus::Upcoming);

    // The caller retries once the store accepts writes again.
    sqlx::query("DROP TRIGGER refuse_status").execute(&pool).await.unwrap();
    assert_eq!(start_tournament(&pool, "rb").await.unwrap().len(), 3);
}

#[tokio::test]
async fn mixed_format_fails_and_leaves_tournament_untouched() {
    let pool = setup().await;
    create_tournament(&pool, "mx", Sport::Football, TournamentFormat::Mixed, 4).await;

    let err = start_tournament(&pool, "mx").await.unwrap_err();
    assert!(matches!(err, FixtureError::UnsupportedFormat(TournamentFormat::Mixed)));

    let tournament = get_tournament(&pool, "mx").await.unwrap().unwrap();
    assert_eq!(tournament.status, TournamentStatus::Upcoming);
    assert!(get_tournament_matches(&pool, "mx").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_tournament_is_reported() {
    let pool = setup().await;
    assert!(matches!(
        start_tournament(&pool, "nope").await,
        Err(FixtureError::TournamentNotFound(_))
    ));
}

#[tokio::test]
async fn registration_respects_order_and_capacity() {
    let pool = setup().await;
    let mut tournament = create_tournament(&pool, "reg", Sport::Football, TournamentFormat::League, 2).await;
    tournament.max_teams = 3;
    insert_tournament(&pool, &tournament).await.unwrap();

    insert_team(&pool, &team("late", Sport::Football)).await.unwrap();
    insert_team(&pool, &team("later", Sport::Football)).await.unwrap();

    add_team_to_tournament(&pool, "reg", "late").await.unwrap();
    let err = add_team_to_tournament(&pool, "reg", "later").await.unwrap_err();
    assert!(matches!(err, FixtureError::InvalidInput(_)));

    let teams = get_tournament_teams(&pool, "reg").await.unwrap();
    let ids: Vec<&str> = teams.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["reg-t0", "reg-t1", "late"]);
    assert_eq!(teams[0].players.len(), 1);
}

#[tokio::test]
async fn results_follow_match_lifecycle_and_update_table() {
    let pool = setup().await;
    create_tournament(&pool, "res", Sport::Football, TournamentFormat::League, 2).await;
    let matches = start_tournament(&pool, "res").await.unwrap();
    let match_id = &matches[0].id;

    // A scheduled match cannot jump straight to a result.
    assert!(matches!(
        record_match_result(&pool, match_id, 2, 0).await,
        Err(FixtureError::InvalidMatchTransition { .. })
    ));

    update_match_status(&pool, match_id, MatchStatus::InProgress).await.unwrap();
    let finished = record_match_result(&pool, match_id, 2, 0).await.unwrap();
    assert_eq!(finished.status, MatchStatus::Completed);
    assert_eq!(finished.result.as_deref(), Some("Team res-t0 won 2-0"));

    let teams = get_tournament_teams(&pool, "res").await.unwrap();
    assert_eq!(teams[0].stats.points, 3);
    assert_eq!(teams[0].stats.goal_difference(), 2);
    assert_eq!(teams[1].stats.losses, 1);

    assert!(update_match_status(&pool, match_id, MatchStatus::InProgress).await.is_err());

    let done = complete_tournament(&pool, "res").await.unwrap();
    assert_eq!(done.status, TournamentStatus::Completed);
}

#[tokio::test]
async fn live_snapshots_replace_the_scoreboard() {
    let pool = setup().await;
    create_tournament(&pool, "live", Sport::Cricket, TournamentFormat::League, 2).await;
    let matches = start_tournament(&pool, "live").await.unwrap();
    let match_id = &matches[0].id;

    let fresh = get_live_score(&pool, match_id).await.unwrap().unwrap();
    assert_eq!(fresh.home.score, 0);
    assert_eq!(fresh.status, MatchStatus::Scheduled);

    let first = apply_live_snapshot(
        &pool,
        match_id,
        &json!({ "status": "IN_PROGRESS", "home_score": 96, "home_wickets": 2, "home_balls": 63 }),
    )
    .await
    .unwrap();
    assert_eq!(first.home.score, 96);

    // Fields missing from the next snapshot read as zero, not as the old value.
    let second = apply_live_snapshot(&pool, match_id, &json!({ "home_score": 101 })).await.unwrap();
    assert_eq!(second.status, MatchStatus::InProgress);
    assert_eq!(second.home.wickets, 0);

    let stored = get_live_score(&pool, match_id).await.unwrap().unwrap();
    assert_eq!(stored, second);

    let backwards = apply_live_snapshot(&pool, match_id, &json!({ "status": "SCHEDULED" })).await;
    assert!(matches!(backwards, Err(FixtureError::InvalidMatchTransition { .. })));
}

#[tokio::test]
async fn live_snapshots_cannot_finish_a_match() {
    let pool = setup().await;
    create_tournament(&pool, "fin", Sport::Football, TournamentFormat::League, 2).await;
    let matches = start_tournament(&pool, "fin").await.unwrap();
    let match_id = &matches[0].id;

    apply_live_snapshot(&pool, match_id, &json!({ "status": "IN_PROGRESS" })).await.unwrap();
    let pushed = apply_live_snapshot(
        &pool,
        match_id,
        &json!({ "status": "COMPLETED", "home_score": 2, "away_score": 0 }),
    )
    .await;
    assert!(matches!(pushed, Err(FixtureError::InvalidInput(_))));

    let live = get_live_score(&pool, match_id).await.unwrap().unwrap();
    assert_eq!(live.status, MatchStatus::InProgress);

    // The result path still finishes the match and credits the table.
    record_match_result(&pool, match_id, 2, 0).await.unwrap();
    let teams = get_tournament_teams(&pool, "fin").await.unwrap();
    assert_eq!((teams[0].stats.points, teams[1].stats.points), (3, 0));
    assert_eq!(teams[0].stats.matches_played, 1);
}

#[tokio::test]
async fn completed_match_keeps_its_final_score() {
    let pool = setup().await;
    create_tournament(&pool, "final", Sport::Football, TournamentFormat::League, 2).await;
    let matches = start_tournament(&pool, "final").await.unwrap();
    let match_id = &matches[0].id;

    update_match_status(&pool, match_id, MatchStatus::InProgress).await.unwrap();
    record_match_result(&pool, match_id, 3, 1).await.unwrap();

    let late = apply_live_snapshot(&pool, match_id, &json!({})).await;
    assert!(matches!(late, Err(FixtureError::InvalidInput(_))));

    let live = get_live_score(&pool, match_id).await.unwrap().unwrap();
    assert_eq!(live.status, MatchStatus::Completed);
    assert_eq!((live.home.score, live.away.score), (3, 1));
    assert_eq!(live.result.as_deref(), Some("Team final-t0 won 3-1"));
}

#[tokio::test]
async fn negative_stats_in_the_store_are_rejected_on_read() {
    let pool = setup().await;
    create_tournament(&pool, "neg", Sport::Football, TournamentFormat::League, 2).await;

    sqlx::query("UPDATE teams SET wins = -1 WHERE id = 'neg-t0'")
        .execute(&pool)
        .await
        .unwrap();
    let err = get_tournament_teams(&pool, "neg").await.unwrap_err();
    assert!(matches!(err, FixtureError::InvalidInput(ref msg) if msg.contains("wins")));

    sqlx::query("UPDATE players SET goals = -2 WHERE team_id = 'neg-t1'")
        .execute(&pool)
        .await
        .unwrap();
    let err = get_tournament_players(&pool, "neg").await.unwrap_err();
    assert!(matches!(err, FixtureError::InvalidInput(ref msg) if msg.contains("goals")));
}

#[tokio::test]
async fn null_stats_in_the_store_read_as_zero() {
    let pool = setup().await;
    create_tournament(&pool, "nul", Sport::Football, TournamentFormat::League, 2).await;

    sqlx::query("UPDATE teams SET points = NULL, goals_for = NULL WHERE id = 'nul-t0'")
        .execute(&pool)
        .await
        .unwrap();
    let teams = get_tournament_teams(&pool, "nul").await.unwrap();
    assert_eq!(teams[0].stats.points, 0);
    assert_eq!(teams[0].stats.goals_for, 0);
}

#[tokio::test]
async fn teams_are_validated_before_they_are_stored() {
    let pool = setup().await;

    let mut blank = team("blank", Sport::Football);
    blank.name = "   ".to_string();
    assert!(matches!(insert_team(&pool, &blank).await, Err(FixtureError::InvalidInput(_))));

    // A batsman has no place in a football squad.
    let mut mixed = team("mixed", Sport::Football);
    mixed.players[0].role = PlayerRole::Batsman;
    assert!(matches!(insert_team(&pool, &mixed).await, Err(FixtureError::InvalidInput(_))));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn tournaments_need_a_venue() {
    let pool = setup().await;
    let mut tournament = create_tournament(&pool, "ven", Sport::Cricket, TournamentFormat::Knockout, 2).await;
    tournament.venue = String::new();
    assert!(matches!(
        insert_tournament(&pool, &tournament).await,
        Err(FixtureError::InvalidInput(_))
    ));

    let stored = get_tournament(&pool, "ven").await.unwrap().unwrap();
    assert_eq!(stored.venue, "Main Ground");
}
