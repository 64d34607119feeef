use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{insert_team, insert_tournament};
use crate::models::{
    Player, PlayerRole, PlayerStats, Sport, Team, TeamStats, Tournament, TournamentFormat,
    TournamentStatus,
};

/// (name, [(player, role, stats)])
type Roster = (&'static str, Vec<(&'static str, PlayerRole, PlayerStats)>);

fn build_team(sport: Sport, stats: TeamStats, roster: Roster) -> Team {
    let now = Utc::now();
    let team_id = Uuid::new_v4().to_string();
    let (name, players) = roster;

    Team {
        id: team_id.clone(),
        name: name.to_string(),
        sport,
        players: players
            .into_iter()
            .map(|(player_name, role, stats)| Player {
                id: Uuid::new_v4().to_string(),
                name: player_name.to_string(),
                team_id: team_id.clone(),
                role,
                stats,
            })
            .collect(),
        stats,
        created_at: now,
        updated_at: now,
    }
}

fn build_tournament(
    name: &str,
    sport: Sport,
    format: TournamentFormat,
    venue: &str,
    teams: &[Team],
) -> Tournament {
    let now = Utc::now();
    Tournament {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        sport,
        format,
        status: TournamentStatus::Upcoming,
        max_teams: 8,
        current_round: 0,
        team_ids: teams.iter().map(|t| t.id.clone()).collect(),
        rules: Some(match sport {
            Sport::Cricket => "20 overs a side, super over on a tie".to_string(),
            Sport::Football => "2 x 30 minute halves, penalties in knockouts".to_string(),
        }),
        prize_pool: Some("5000".to_string()),
        venue: venue.to_string(),
        organizer: Some("City Sports Club".to_string()),
        created_at: now,
        updated_at: now,
    }
}

fn football_teams() -> Vec<Team> {
    let goals = |goals, assists| PlayerStats { goals, assists, ..Default::default() };
    let keeper = |clean_sheets, saves| PlayerStats { clean_sheets, saves, ..Default::default() };
    let record = |wins, draws, losses, goals_for, goals_against| TeamStats {
        matches_played: wins + draws + losses,
        wins,
        draws,
        losses,
        points: wins * 3 + draws,
        goals_for,
        goals_against,
    };

    vec![
        build_team(
            Sport::Football,
            record(2, 1, 0, 7, 2),
            ("Riverside Rovers", vec![
                ("Sam Okafor", PlayerRole::Goalkeeper, keeper(2, 11)),
                ("Leo Brandt", PlayerRole::Forward, goals(4, 1)),
                ("Iker Sola", PlayerRole::Midfielder, goals(1, 3)),
                ("Tom Hale", PlayerRole::Defender, PlayerStats::default()),
            ]),
        ),
        build_team(
            Sport::Football,
            record(2, 1, 0, 5, 1),
            ("Hilltop United", vec![
                ("Marek Nowak", PlayerRole::Goalkeeper, keeper(2, 15)),
                ("Dev Patel", PlayerRole::Forward, goals(4, 2)),
                ("Ola Berg", PlayerRole::Defender, goals(0, 1)),
            ]),
        ),
        build_team(
            Sport::Football,
            record(1, 0, 2, 3, 6),
            ("Harbour Athletic", vec![
                ("Ken Ito", PlayerRole::Goalkeeper, keeper(0, 20)),
                ("Rui Costa", PlayerRole::Forward, goals(2, 0)),
            ]),
        ),
        build_team(
            Sport::Football,
            record(0, 0, 3, 1, 7),
            ("Northgate FC", vec![
                ("Abe Lin", PlayerRole::Goalkeeper, keeper(0, 9)),
                ("Noah Reid", PlayerRole::Midfielder, goals(1, 0)),
            ]),
        ),
    ]
}

fn cricket_teams() -> Vec<Team> {
    let bat = |runs| PlayerStats { runs, ..Default::default() };
    let bowl = |wickets, catches| PlayerStats { wickets, catches, ..Default::default() };

    let rosters: Vec<Roster> = vec![
        ("Mumbai Strikers", vec![
            ("Rohan Mehta", PlayerRole::Batsman, bat(212)),
            ("Arjun Rao", PlayerRole::Bowler, bowl(9, 2)),
        ]),
        ("Chennai Kings", vec![
            ("Vikram Iyer", PlayerRole::Batsman, bat(188)),
            ("Karthik Das", PlayerRole::WicketKeeper, PlayerStats { runs: 64, catches: 7, ..Default::default() }),
        ]),
        ("Delhi Dynamos", vec![
            ("Aman Gill", PlayerRole::AllRounder, PlayerStats { runs: 121, wickets: 6, ..Default::default() }),
            ("Farhan Ali", PlayerRole::Bowler, bowl(11, 1)),
        ]),
        ("Kolkata Knights", vec![("Sourav Sen", PlayerRole::Batsman, bat(97))]),
        ("Punjab Lions", vec![("Harpreet Singh", PlayerRole::Bowler, bowl(4, 3))]),
    ];

    rosters
        .into_iter()
        .map(|roster| build_team(Sport::Cricket, TeamStats::default(), roster))
        .collect()
}

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tournaments")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already has {} tournaments, skipping seed", count);
        return Ok(());
    }

    let football = football_teams();
    let cricket = cricket_teams();

    for team in football.iter().chain(cricket.iter()) {
        insert_team(pool, team).await?;
    }

    let tournaments = vec![
        build_tournament("Sunday League", Sport::Football, TournamentFormat::League, "Riverside Park", &football),
        build_tournament("City T20 Cup", Sport::Cricket, TournamentFormat::Knockout, "Central Oval", &cricket),
        build_tournament("Champions Series", Sport::Football, TournamentFormat::Mixed, "Harbour Stadium", &football),
    ];

    for tournament in &tournaments {
        insert_tournament(pool, tournament).await?;
    }

    tracing::info!(
        "Seeded {} tournaments with {} teams",
        tournaments.len(),
        football.len() + cricket.len()
    );
    Ok(())
}
