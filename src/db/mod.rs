pub mod seed;
pub use seed::seed_data;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteQueryResult, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::str::FromStr;

use crate::error::{FixtureError, FixtureResult};
use crate::models::*;
use crate::services::{plan_start, points_for, result_summary};
use crate::utils::validate_name;

pub async fn create_pool(database_url: &str) -> FixtureResult<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    if !in_memory {
        // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
        let file_path = database_url
            .strip_prefix("sqlite:///")
            .or_else(|| database_url.strip_prefix("sqlite://"))
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        if let Some(parent) = std::path::Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives and dies with its single connection.
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database(database_url: &str) -> FixtureResult<SqlitePool> {
    let pool = create_pool(database_url).await?;
    init_database_with_pool(&pool).await?;
    Ok(pool)
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> FixtureResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tournaments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sport TEXT NOT NULL,
            format TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'UPCOMING',
            max_teams INTEGER NOT NULL DEFAULT 0,
            current_round INTEGER NOT NULL DEFAULT 0,
            rules TEXT,
            prize_pool TEXT,
            venue TEXT NOT NULL,
            organizer TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Stat columns are nullable: documents written by older clients omit them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sport TEXT NOT NULL,
            matches_played INTEGER,
            wins INTEGER,
            draws INTEGER,
            losses INTEGER,
            points INTEGER,
            goals_for INTEGER,
            goals_against INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            roster_position INTEGER NOT NULL DEFAULT 0,
            runs INTEGER,
            wickets INTEGER,
            catches INTEGER,
            goals INTEGER,
            assists INTEGER,
            yellow_cards INTEGER,
            red_cards INTEGER,
            saves INTEGER,
            clean_sheets INTEGER,
            FOREIGN KEY (team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tournament_teams (
            tournament_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (tournament_id, team_id),
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id),
            FOREIGN KEY (team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            tournament_id TEXT NOT NULL,
            home_team_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            home_team_name TEXT NOT NULL,
            away_team_name TEXT NOT NULL,
            match_date TEXT,
            venue TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'SCHEDULED',
            round INTEGER NOT NULL,
            sequence INTEGER NOT NULL,
            result TEXT,
            home_score INTEGER,
            away_score INTEGER,
            home_wickets INTEGER,
            away_wickets INTEGER,
            home_balls INTEGER,
            away_balls INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (tournament_id, sequence),
            FOREIGN KEY (tournament_id) REFERENCES tournaments (id),
            FOREIGN KEY (home_team_id) REFERENCES teams (id),
            FOREIGN KEY (away_team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_tournament ON matches(tournament_id, sequence)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

// Row mapping

fn parse_timestamp(raw: &str) -> FixtureResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| FixtureError::invalid(format!("bad timestamp '{}': {}", raw, e)))
}

fn tournament_from_row(row: &SqliteRow, team_ids: Vec<String>) -> FixtureResult<Tournament> {
    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        sport: row.get::<String, _>("sport").parse()?,
        format: row.get::<String, _>("format").parse()?,
        status: row.get::<String, _>("status").parse()?,
        max_teams: row.get::<i64, _>("max_teams").max(0) as u32,
        current_round: row.get::<i64, _>("current_round").max(0) as u32,
        team_ids,
        rules: row.get("rules"),
        prize_pool: row.get("prize_pool"),
        venue: row.get("venue"),
        organizer: row.get("organizer"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn team_from_row(row: &SqliteRow, players: Vec<Player>) -> FixtureResult<Team> {
    let raw = RawTeamStats {
        matches_played: row.get("matches_played"),
        wins: row.get("wins"),
        draws: row.get("draws"),
        losses: row.get("losses"),
        points: row.get("points"),
        goals_for: row.get("goals_for"),
        goals_against: row.get("goals_against"),
    };

    Ok(Team {
        id: row.get("id"),
        name: row.get("name"),
        sport: row.get::<String, _>("sport").parse()?,
        players,
        stats: TeamStats::try_from(raw)?,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn player_from_row(row: &SqliteRow) -> FixtureResult<Player> {
    let raw = RawPlayerStats {
        runs: row.get("runs"),
        wickets: row.get("wickets"),
        catches: row.get("catches"),
        goals: row.get("goals"),
        assists: row.get("assists"),
        yellow_cards: row.get("yellow_cards"),
        red_cards: row.get("red_cards"),
        saves: row.get("saves"),
        clean_sheets: row.get("clean_sheets"),
    };

    Ok(Player {
        id: row.get("id"),
        name: row.get("name"),
        team_id: row.get("team_id"),
        role: row.get::<String, _>("role").parse()?,
        stats: PlayerStats::try_from(raw)?,
    })
}

fn match_from_row(row: &SqliteRow) -> FixtureResult<Match> {
    let match_date = row
        .get::<Option<String>, _>("match_date")
        .map(|d| parse_timestamp(&d))
        .transpose()?;

    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        home_team_id: row.get("home_team_id"),
        away_team_id: row.get("away_team_id"),
        home_team_name: row.get("home_team_name"),
        away_team_name: row.get("away_team_name"),
        match_date,
        venue: row.get("venue"),
        status: row.get::<String, _>("status").parse()?,
        round: row.get::<i64, _>("round").max(0) as u32,
        sequence: row.get::<i64, _>("sequence").max(0) as u32,
        result: row.get("result"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn live_score_from_row(row: &SqliteRow) -> FixtureResult<LiveScore> {
    RawLiveScore {
        status: row.get("status"),
        home_score: row.get("home_score"),
        away_score: row.get("away_score"),
        home_wickets: row.get("home_wickets"),
        away_wickets: row.get("away_wickets"),
        home_balls: row.get("home_balls"),
        away_balls: row.get("away_balls"),
        result: row.get("result"),
    }
    .into_live_score(&row.get::<String, _>("id"))
}

// Connection-level helpers, shared by pool reads and transactions

async fn fetch_tournament(conn: &mut SqliteConnection, tournament_id: &str) -> FixtureResult<Option<Tournament>> {
    let row = sqlx::query("SELECT * FROM tournaments WHERE id = ?")
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let team_ids: Vec<String> = sqlx::query_scalar(
        "SELECT team_id FROM tournament_teams WHERE tournament_id = ? ORDER BY position",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(tournament_from_row(&row, team_ids)?))
}

async fn fetch_team_players(conn: &mut SqliteConnection, team_id: &str) -> FixtureResult<Vec<Player>> {
    let rows = sqlx::query("SELECT * FROM players WHERE team_id = ? ORDER BY roster_position, name")
        .bind(team_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(player_from_row).collect()
}

async fn fetch_tournament_teams(conn: &mut SqliteConnection, tournament_id: &str) -> FixtureResult<Vec<Team>> {
    let rows = sqlx::query(
        r#"
        SELECT t.* FROM teams t
        JOIN tournament_teams tt ON tt.team_id = t.id
        WHERE tt.tournament_id = ?
        ORDER BY tt.position
        "#,
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut teams = Vec::with_capacity(rows.len());
    for row in rows {
        let team_id: String = row.get("id");
        let players = fetch_team_players(conn, &team_id).await?;
        teams.push(team_from_row(&row, players)?);
    }
    Ok(teams)
}

async fn fetch_match(conn: &mut SqliteConnection, match_id: &str) -> FixtureResult<Option<Match>> {
    let row = sqlx::query("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(match_from_row).transpose()
}

async fn write_match(conn: &mut SqliteConnection, match_data: &Match) -> FixtureResult<()> {
    sqlx::query(
        r#"
        INSERT INTO matches
        (id, tournament_id, home_team_id, away_team_id, home_team_name, away_team_name,
         match_date, venue, status, round, sequence, result, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&match_data.id)
    .bind(&match_data.tournament_id)
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(&match_data.home_team_name)
    .bind(&match_data.away_team_name)
    .bind(match_data.match_date.map(|d| d.to_rfc3339()))
    .bind(&match_data.venue)
    .bind(match_data.status.as_str())
    .bind(match_data.round)
    .bind(match_data.sequence)
    .bind(&match_data.result)
    .bind(match_data.created_at.to_rfc3339())
    .bind(match_data.updated_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Status writes are conditional on the status the caller read. Zero rows
/// means another writer got there first.
fn ensure_status_held(
    result: SqliteQueryResult,
    entity: &'static str,
    id: &str,
    expected: impl ToString,
) -> FixtureResult<()> {
    if result.rows_affected() == 1 {
        Ok(())
    } else {
        Err(FixtureError::StaleStatus {
            entity,
            id: id.to_string(),
            expected: expected.to_string(),
        })
    }
}

async fn set_match_status(
    conn: &mut SqliteConnection,
    match_id: &str,
    from: MatchStatus,
    to: MatchStatus,
    now: DateTime<Utc>,
) -> FixtureResult<()> {
    let result = sqlx::query("UPDATE matches SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(to.as_str())
        .bind(now.to_rfc3339())
        .bind(match_id)
        .bind(from.as_str())
        .execute(&mut *conn)
        .await?;

    ensure_status_held(result, "match", match_id, from)
}

async fn write_live_score(
    conn: &mut SqliteConnection,
    live: &LiveScore,
    expected: MatchStatus,
) -> FixtureResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE matches SET
            status = ?, result = ?, home_score = ?, away_score = ?, home_wickets = ?,
            away_wickets = ?, home_balls = ?, away_balls = ?, updated_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(live.status.as_str())
    .bind(&live.result)
    .bind(live.home.score)
    .bind(live.away.score)
    .bind(live.home.wickets)
    .bind(live.away.wickets)
    .bind(live.home.balls)
    .bind(live.away.balls)
    .bind(Utc::now().to_rfc3339())
    .bind(&live.match_id)
    .bind(expected.as_str())
    .execute(&mut *conn)
    .await?;

    ensure_status_held(result, "match", &live.match_id, expected)
}

// Tournament operations

pub async fn insert_tournament(pool: &SqlitePool, tournament: &Tournament) -> FixtureResult<()> {
    validate_name("tournament", &tournament.name)?;
    // Every generated fixture is played here.
    validate_name("venue", &tournament.venue)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO tournaments
        (id, name, sport, format, status, max_teams, current_round, rules, prize_pool,
         venue, organizer, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            sport = excluded.sport,
            format = excluded.format,
            status = excluded.status,
            max_teams = excluded.max_teams,
            current_round = excluded.current_round,
            rules = excluded.rules,
            prize_pool = excluded.prize_pool,
            venue = excluded.venue,
            organizer = excluded.organizer,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&tournament.id)
    .bind(&tournament.name)
    .bind(tournament.sport.as_str())
    .bind(tournament.format.as_str())
    .bind(tournament.status.as_str())
    .bind(tournament.max_teams)
    .bind(tournament.current_round)
    .bind(&tournament.rules)
    .bind(&tournament.prize_pool)
    .bind(&tournament.venue)
    .bind(&tournament.organizer)
    .bind(tournament.created_at.to_rfc3339())
    .bind(tournament.updated_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM tournament_teams WHERE tournament_id = ?")
        .bind(&tournament.id)
        .execute(&mut *tx)
        .await?;

    for (position, team_id) in tournament.team_ids.iter().enumerate() {
        sqlx::query("INSERT INTO tournament_teams (tournament_id, team_id, position) VALUES (?, ?, ?)")
            .bind(&tournament.id)
            .bind(team_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn get_tournament(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Option<Tournament>> {
    let mut conn = pool.acquire().await?;
    fetch_tournament(&mut conn, tournament_id).await
}

pub async fn list_tournaments(pool: &SqlitePool) -> FixtureResult<Vec<Tournament>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM tournaments ORDER BY created_at DESC, name")
        .fetch_all(pool)
        .await?;

    let mut conn = pool.acquire().await?;
    let mut tournaments = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(tournament) = fetch_tournament(&mut conn, &id).await? {
            tournaments.push(tournament);
        }
    }
    Ok(tournaments)
}

/// Register a team while the tournament is still accepting entries.
pub async fn add_team_to_tournament(pool: &SqlitePool, tournament_id: &str, team_id: &str) -> FixtureResult<()> {
    let mut tx = pool.begin().await?;

    let tournament = fetch_tournament(&mut tx, tournament_id)
        .await?
        .ok_or_else(|| FixtureError::TournamentNotFound(tournament_id.to_string()))?;

    if tournament.status != TournamentStatus::Upcoming {
        return Err(FixtureError::invalid(format!(
            "tournament {} is {}, registration is closed",
            tournament.name, tournament.status
        )));
    }
    if tournament.team_ids.iter().any(|id| id == team_id) {
        return Ok(());
    }
    if tournament.max_teams > 0 && tournament.team_ids.len() >= tournament.max_teams as usize {
        return Err(FixtureError::invalid(format!(
            "tournament {} is full ({} teams)",
            tournament.name, tournament.max_teams
        )));
    }

    sqlx::query("INSERT INTO tournament_teams (tournament_id, team_id, position) VALUES (?, ?, ?)")
        .bind(tournament_id)
        .bind(team_id)
        .bind(tournament.team_ids.len() as i64)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("Registered team {} for {}", team_id, tournament.name);
    Ok(())
}

/// Generate the fixture list and move the tournament to IN_PROGRESS.
///
/// Matches and the status change are written in one transaction. If either
/// write fails nothing is kept: the tournament stays UPCOMING with no
/// matches, and calling this again is safe.
pub async fn start_tournament(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Vec<Match>> {
    let mut tx = pool.begin().await?;

    let tournament = fetch_tournament(&mut tx, tournament_id)
        .await?
        .ok_or_else(|| FixtureError::TournamentNotFound(tournament_id.to_string()))?;
    let teams = fetch_tournament_teams(&mut tx, tournament_id).await?;
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches WHERE tournament_id = ?")
        .bind(tournament_id)
        .fetch_one(&mut *tx)
        .await?;

    let plan = plan_start(&tournament, &teams, existing.max(0) as usize)?;
    let next_status = plan.next_status;
    let current_round = plan.current_round;
    let matches = plan.into_matches();

    for match_data in &matches {
        write_match(&mut tx, match_data).await?;
    }

    let updated = sqlx::query(
        "UPDATE tournaments SET status = ?, current_round = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(next_status.as_str())
    .bind(current_round)
    .bind(Utc::now().to_rfc3339())
    .bind(tournament_id)
    .bind(TournamentStatus::Upcoming.as_str())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() != 1 {
        // Dropping the transaction rolls the match inserts back.
        return Err(FixtureError::PartialPersistence {
            tournament_id: tournament_id.to_string(),
            detail: "status changed while fixtures were being written".to_string(),
        });
    }

    tx.commit().await?;

    tracing::info!(
        "Started {} ({}): {} matches across {} teams",
        tournament.name,
        tournament.format,
        matches.len(),
        teams.len()
    );

    Ok(matches)
}

pub async fn complete_tournament(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Tournament> {
    let mut conn = pool.acquire().await?;
    let tournament = fetch_tournament(&mut conn, tournament_id)
        .await?
        .ok_or_else(|| FixtureError::TournamentNotFound(tournament_id.to_string()))?;

    let next = tournament.status.transition_to(TournamentStatus::Completed)?;
    let now = Utc::now();

    let result = sqlx::query("UPDATE tournaments SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(next.as_str())
        .bind(now.to_rfc3339())
        .bind(tournament_id)
        .bind(tournament.status.as_str())
        .execute(&mut *conn)
        .await?;
    ensure_status_held(result, "tournament", tournament_id, tournament.status)?;

    tracing::info!("Tournament {} completed", tournament.name);

    Ok(Tournament {
        status: next,
        updated_at: now,
        ..tournament
    })
}

// Team operations

pub async fn insert_team(pool: &SqlitePool, team: &Team) -> FixtureResult<()> {
    validate_name("team", &team.name)?;
    for player in &team.players {
        validate_name("player", &player.name)?;
        if player.role.sport() != team.sport {
            return Err(FixtureError::invalid(format!(
                "{} is listed as {} ({}) on {} team {}",
                player.name,
                player.role,
                player.role.sport(),
                team.sport,
                team.name
            )));
        }
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO teams
        (id, name, sport, matches_played, wins, draws, losses, points, goals_for, goals_against,
         created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            sport = excluded.sport,
            matches_played = excluded.matches_played,
            wins = excluded.wins,
            draws = excluded.draws,
            losses = excluded.losses,
            points = excluded.points,
            goals_for = excluded.goals_for,
            goals_against = excluded.goals_against,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(team.sport.as_str())
    .bind(team.stats.matches_played)
    .bind(team.stats.wins)
    .bind(team.stats.draws)
    .bind(team.stats.losses)
    .bind(team.stats.points)
    .bind(team.stats.goals_for)
    .bind(team.stats.goals_against)
    .bind(team.created_at.to_rfc3339())
    .bind(team.updated_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    for (position, player) in team.players.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO players
            (id, team_id, name, role, roster_position, runs, wickets, catches, goals, assists,
             yellow_cards, red_cards, saves, clean_sheets)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                team_id = excluded.team_id,
                name = excluded.name,
                role = excluded.role,
                roster_position = excluded.roster_position,
                runs = excluded.runs,
                wickets = excluded.wickets,
                catches = excluded.catches,
                goals = excluded.goals,
                assists = excluded.assists,
                yellow_cards = excluded.yellow_cards,
                red_cards = excluded.red_cards,
                saves = excluded.saves,
                clean_sheets = excluded.clean_sheets
            "#,
        )
        .bind(&player.id)
        .bind(&team.id)
        .bind(&player.name)
        .bind(player.role.as_str())
        .bind(position as i64)
        .bind(player.stats.runs)
        .bind(player.stats.wickets)
        .bind(player.stats.catches)
        .bind(player.stats.goals)
        .bind(player.stats.assists)
        .bind(player.stats.yellow_cards)
        .bind(player.stats.red_cards)
        .bind(player.stats.saves)
        .bind(player.stats.clean_sheets)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn get_all_teams(pool: &SqlitePool) -> FixtureResult<Vec<Team>> {
    let rows = sqlx::query("SELECT * FROM teams ORDER BY sport, name")
        .fetch_all(pool)
        .await?;

    let mut conn = pool.acquire().await?;
    let mut teams = Vec::with_capacity(rows.len());
    for row in rows {
        let team_id: String = row.get("id");
        let players = fetch_team_players(&mut conn, &team_id).await?;
        teams.push(team_from_row(&row, players)?);
    }
    Ok(teams)
}

pub async fn get_tournament_teams(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Vec<Team>> {
    let mut conn = pool.acquire().await?;
    fetch_tournament_teams(&mut conn, tournament_id).await
}

/// Every rostered player of every team in the tournament, team order first.
pub async fn get_tournament_players(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Vec<Player>> {
    let rows = sqlx::query(
        r#"
        SELECT p.* FROM players p
        JOIN tournament_teams tt ON tt.team_id = p.team_id
        WHERE tt.tournament_id = ?
        ORDER BY tt.position, p.roster_position, p.name
        "#,
    )
    .bind(tournament_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(player_from_row).collect()
}

// Match operations

pub async fn get_tournament_matches(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Vec<Match>> {
    let rows = sqlx::query("SELECT * FROM matches WHERE tournament_id = ? ORDER BY sequence")
        .bind(tournament_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(match_from_row).collect()
}

pub async fn get_match(pool: &SqlitePool, match_id: &str) -> FixtureResult<Option<Match>> {
    let mut conn = pool.acquire().await?;
    fetch_match(&mut conn, match_id).await
}

pub async fn get_tournament_detail(pool: &SqlitePool, tournament_id: &str) -> FixtureResult<Option<TournamentDetail>> {
    let Some(tournament) = get_tournament(pool, tournament_id).await? else {
        return Ok(None);
    };
    let teams = get_tournament_teams(pool, tournament_id).await?;
    let matches = get_tournament_matches(pool, tournament_id).await?;

    Ok(Some(TournamentDetail {
        tournament,
        teams,
        matches,
    }))
}

pub async fn get_live_score(pool: &SqlitePool, match_id: &str) -> FixtureResult<Option<LiveScore>> {
    let row = sqlx::query("SELECT * FROM matches WHERE id = ?")
        .bind(match_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(live_score_from_row).transpose()
}

/// Replace the stored scoreboard of a live match with a pushed snapshot.
///
/// Missing fields in the snapshot are written as zero, not kept from the
/// previous snapshot. A status in the snapshot must be the current one or
/// the next step forward, short of COMPLETED: only `record_match_result`
/// finishes a match. A completed match keeps its final score.
pub async fn apply_live_snapshot(
    pool: &SqlitePool,
    match_id: &str,
    snapshot: &serde_json::Value,
) -> FixtureResult<LiveScore> {
    let mut live = parse_live_snapshot(match_id, snapshot)?;

    let mut conn = pool.acquire().await?;
    let current = fetch_match(&mut conn, match_id)
        .await?
        .ok_or_else(|| FixtureError::MatchNotFound(match_id.to_string()))?;

    if current.status == MatchStatus::Completed {
        return Err(FixtureError::invalid(format!(
            "match {} is completed, its final score is recorded",
            match_id
        )));
    }
    if snapshot.get("status").map_or(true, |s| s.is_null()) {
        live.status = current.status;
    } else if live.status == MatchStatus::Completed {
        return Err(FixtureError::invalid(
            "live snapshots cannot complete a match, record the result instead",
        ));
    } else if live.status != current.status {
        current.status.transition_to(live.status)?;
    }

    write_live_score(&mut conn, &live, current.status).await?;

    tracing::debug!(
        "Live update for {}: {}-{} ({})",
        match_id,
        live.home.score,
        live.away.score,
        live.status
    );

    Ok(live)
}

pub async fn update_match_status(pool: &SqlitePool, match_id: &str, next: MatchStatus) -> FixtureResult<Match> {
    let mut conn = pool.acquire().await?;
    let current = fetch_match(&mut conn, match_id)
        .await?
        .ok_or_else(|| FixtureError::MatchNotFound(match_id.to_string()))?;

    let status = current.status.transition_to(next)?;
    let now = Utc::now();

    set_match_status(&mut conn, match_id, current.status, status, now).await?;

    tracing::info!(
        "{} vs {} is now {}",
        current.home_team_name,
        current.away_team_name,
        status
    );

    Ok(Match {
        status,
        updated_at: now,
        ..current
    })
}

/// Close an in-progress match with its final score and credit both teams.
pub async fn record_match_result(
    pool: &SqlitePool,
    match_id: &str,
    home_score: u32,
    away_score: u32,
) -> FixtureResult<Match> {
    let mut tx = pool.begin().await?;

    let current = fetch_match(&mut tx, match_id)
        .await?
        .ok_or_else(|| FixtureError::MatchNotFound(match_id.to_string()))?;
    let status = current.status.transition_to(MatchStatus::Completed)?;

    let sport: String = sqlx::query_scalar("SELECT sport FROM tournaments WHERE id = ?")
        .bind(&current.tournament_id)
        .fetch_one(&mut *tx)
        .await?;
    let sport: Sport = sport.parse()?;

    let result = result_summary(&current, home_score, away_score);
    let now = Utc::now();

    let written = sqlx::query(
        r#"
        UPDATE matches SET status = ?, result = ?, home_score = ?, away_score = ?, updated_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(status.as_str())
    .bind(&result)
    .bind(home_score)
    .bind(away_score)
    .bind(now.to_rfc3339())
    .bind(match_id)
    .bind(current.status.as_str())
    .execute(&mut *tx)
    .await?;
    ensure_status_held(written, "match", match_id, current.status)?;

    for (team_id, scored, conceded) in [
        (&current.home_team_id, home_score, away_score),
        (&current.away_team_id, away_score, home_score),
    ] {
        let (win, draw, loss) = match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => (1, 0, 0),
            std::cmp::Ordering::Equal => (0, 1, 0),
            std::cmp::Ordering::Less => (0, 0, 1),
        };
        sqlx::query(
            r#"
            UPDATE teams SET
                matches_played = COALESCE(matches_played, 0) + 1,
                wins = COALESCE(wins, 0) + ?,
                draws = COALESCE(draws, 0) + ?,
                losses = COALESCE(losses, 0) + ?,
                points = COALESCE(points, 0) + ?,
                goals_for = COALESCE(goals_for, 0) + ?,
                goals_against = COALESCE(goals_against, 0) + ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(win)
        .bind(draw)
        .bind(loss)
        .bind(points_for(sport, scored, conceded))
        .bind(scored)
        .bind(conceded)
        .bind(now.to_rfc3339())
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!("{}", result);

    Ok(Match {
        status,
        result: Some(result),
        updated_at: now,
        ..current
    })
}
