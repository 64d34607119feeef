use anyhow::{anyhow, Result};
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::db::{
    get_all_teams, get_live_score, get_match, get_tournament, get_tournament_matches,
    get_tournament_players, get_tournament_teams, init_database, list_tournaments, seed_data,
    start_tournament,
};
use crate::error::FixtureError;
use crate::models::{PlayerStanding, Sport};
use crate::services::{generate_schedule, StandingsBoard};
use crate::utils::{closest_name, format_match_date, format_side_score};

async fn open(config: &AppConfig) -> Result<SqlitePool> {
    Ok(init_database(&config.database_url).await?)
}

pub async fn seed(config: &AppConfig) -> Result<()> {
    let pool = open(config).await?;
    seed_data(&pool).await?;
    println!("✅ Demo tournaments ready. List them with: fixtureforge tournaments");
    Ok(())
}

pub async fn show_tournaments(config: &AppConfig) -> Result<()> {
    let pool = open(config).await?;
    let tournaments = list_tournaments(&pool).await?;

    if tournaments.is_empty() {
        println!("📭 No tournaments found. Try: fixtureforge seed");
        return Ok(());
    }

    println!("🏆 Tournaments:\n");
    for t in tournaments {
        println!(
            "   • {} [{}] {} {} - {} teams, round {} @ {}",
            t.name,
            t.id,
            t.sport,
            t.format,
            t.team_ids.len(),
            t.current_round,
            t.venue
        );
        println!("     status: {}", t.status);
    }

    Ok(())
}

pub async fn start(config: &AppConfig, tournament_id: &str) -> Result<()> {
    let pool = open(config).await?;
    start_on(&pool, tournament_id).await
}

async fn start_on(pool: &SqlitePool, tournament_id: &str) -> Result<()> {
    match start_tournament(pool, tournament_id).await {
        Ok(matches) => {
            println!("✅ Tournament started with {} matches:\n", matches.len());
            for m in &matches {
                println!(
                    "   #{:<3} R{} {} vs {} ({})",
                    m.sequence,
                    m.round,
                    m.home_team_name,
                    m.away_team_name,
                    format_match_date(m.match_date)
                );
            }
            Ok(())
        }
        Err(e @ FixtureError::UnsupportedFormat(_)) => {
            println!("❌ This tournament cannot be scheduled automatically yet");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn preview(config: &AppConfig, tournament_id: &str) -> Result<()> {
    let pool = open(config).await?;
    let tournament = get_tournament(&pool, tournament_id)
        .await?
        .ok_or_else(|| anyhow!("Tournament not found: {}", tournament_id))?;
    let teams = get_tournament_teams(&pool, tournament_id).await?;

    let fixtures = generate_schedule(tournament.format, &teams, &tournament.venue)?;

    println!(
        "🗓️  {} ({}) at {} - provisional schedule:\n",
        tournament.name, tournament.format, tournament.venue
    );
    let mut current_round = 0;
    for f in &fixtures {
        if f.round != current_round {
            current_round = f.round;
            println!("   Round {}", current_round);
        }
        println!("     #{:<3} {} vs {}", f.sequence, f.home_team_name, f.away_team_name);
    }
    if fixtures.is_empty() {
        println!("   Not enough teams to schedule ({} registered)", teams.len());
    }

    Ok(())
}

pub async fn live(config: &AppConfig, match_id: &str) -> Result<()> {
    let pool = open(config).await?;
    let match_data = get_match(&pool, match_id)
        .await?
        .ok_or_else(|| anyhow!("Match not found: {}", match_id))?;
    let tournament = get_tournament(&pool, &match_data.tournament_id)
        .await?
        .ok_or_else(|| anyhow!("Tournament not found: {}", match_data.tournament_id))?;
    let Some(live) = get_live_score(&pool, match_id).await? else {
        return Err(anyhow!("Match not found: {}", match_id));
    };

    println!("📺 {} - R{} #{}", tournament.name, match_data.round, match_data.sequence);
    println!(
        "   {:<22} {}",
        match_data.home_team_name,
        format_side_score(tournament.sport, &live.home)
    );
    println!(
        "   {:<22} {}",
        match_data.away_team_name,
        format_side_score(tournament.sport, &live.away)
    );
    println!("   {} @ {}", live.status, match_data.venue);
    if let Some(result) = &live.result {
        println!("   {}", result);
    }

    Ok(())
}

fn print_players(title: &str, rows: &[PlayerStanding], line: impl Fn(&PlayerStanding) -> String) {
    if rows.is_empty() {
        return;
    }
    println!("\n{}", title);
    for row in rows.iter().take(10) {
        println!("   {:>2}. {:<20} {}", row.position, row.player_name, line(row));
    }
}

pub async fn standings(config: &AppConfig, tournament_id: &str) -> Result<()> {
    let pool = open(config).await?;
    let tournament = get_tournament(&pool, tournament_id)
        .await?
        .ok_or_else(|| anyhow!("Tournament not found: {}", tournament_id))?;
    let teams = get_tournament_teams(&pool, tournament_id).await?;
    let players = get_tournament_players(&pool, tournament_id).await?;
    let board = StandingsBoard::compute(&teams, &players);

    println!("📊 {} standings\n", tournament.name);
    println!("   {:>2}  {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}", "#", "Team", "P", "W", "D", "L", "GD", "Pts");
    for row in &board.teams {
        println!(
            "   {:>2}. {:<22} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}",
            row.position,
            row.team_name,
            row.stats.matches_played,
            row.stats.wins,
            row.stats.draws,
            row.stats.losses,
            row.goal_difference,
            row.stats.points
        );
    }

    match tournament.sport {
        Sport::Football => {
            print_players("⚽ Top scorers:", &board.top_scorers, |p| {
                format!("{} goals, {} assists", p.stats.goals, p.stats.assists)
            });
            print_players("🧤 Goalkeepers:", &board.goalkeepers, |p| {
                format!("{} clean sheets, {} saves", p.stats.clean_sheets, p.stats.saves)
            });
        }
        Sport::Cricket => {
            print_players("🏏 Most runs:", &board.run_scorers, |p| format!("{} runs", p.stats.runs));
            print_players("🎯 Most wickets:", &board.wicket_takers, |p| {
                format!("{} wickets, {} catches", p.stats.wickets, p.stats.catches)
            });
        }
    }

    let matches = get_tournament_matches(&pool, tournament_id).await?;
    let completed = matches.iter().filter(|m| m.result.is_some()).count();
    println!("\n📅 {} of {} matches completed", completed, matches.len());

    Ok(())
}

/// Write the team table to `<export_dir>/standings_<id>.csv`.
pub async fn export_standings(config: &AppConfig, tournament_id: &str) -> Result<PathBuf> {
    let pool = open(config).await?;
    let teams = get_tournament_teams(&pool, tournament_id).await?;
    let board = StandingsBoard::compute(&teams, &[]);

    tokio::fs::create_dir_all(&config.export_dir).await?;
    let path = PathBuf::from(&config.export_dir).join(format!("standings_{}.csv", tournament_id));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "position", "team", "played", "wins", "draws", "losses", "goals_for", "goals_against",
        "goal_difference", "points",
    ])?;
    for row in &board.teams {
        writer.write_record(&[
            row.position.to_string(),
            row.team_name.clone(),
            row.stats.matches_played.to_string(),
            row.stats.wins.to_string(),
            row.stats.draws.to_string(),
            row.stats.losses.to_string(),
            row.stats.goals_for.to_string(),
            row.stats.goals_against.to_string(),
            row.goal_difference.to_string(),
            row.stats.points.to_string(),
        ])?;
    }
    writer.flush()?;

    tracing::info!("Exported {} standings rows to {}", board.teams.len(), path.display());
    println!("✅ Standings written to {}", path.display());
    Ok(path)
}

pub async fn query_team(config: &AppConfig, team_name: &str) -> Result<()> {
    let pool = open(config).await?;
    let teams = get_all_teams(&pool).await?;

    println!("🔍 Searching for team: {}", team_name);

    let Some((best, score)) = closest_name(team_name, teams.iter().map(|t| t.name.as_str()), 0.75) else {
        println!("❌ No teams found matching '{}'", team_name);
        println!("\n💡 Available teams:");
        for team in teams.iter().take(10) {
            println!("   • {} ({})", team.name, team.sport);
        }
        return Ok(());
    };

    let Some(team) = teams.iter().find(|t| t.name == best) else {
        return Ok(());
    };

    if score < 1.0 {
        println!("📋 Closest match: {} ({:.0}% similar)", team.name, score * 100.0);
    }

    println!("\n📊 Team Details:");
    println!("   Name: {} ({})", team.name, team.sport);
    println!(
        "   Record: {}W {}D {}L, {} pts, GD {}",
        team.stats.wins,
        team.stats.draws,
        team.stats.losses,
        team.stats.points,
        team.stats.goal_difference()
    );
    println!("   Last Updated: {}", team.updated_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\n👥 Roster:");
    if team.players.is_empty() {
        println!("   No players registered");
    }
    for player in &team.players {
        println!("   • {} ({})", player.name, player.role);
    }

    Ok(())
}
