use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Player, PlayerRole, PlayerStanding, Team, TeamStanding};

// All rankings below go through `slice::sort_by`, which is a stable sort:
// entries equal on every key keep their input order.

/// Team table: points desc, then goal difference desc.
pub fn rank_teams(teams: &[Team]) -> Vec<TeamStanding> {
    let mut ranked: Vec<&Team> = teams.iter().collect();
    ranked.sort_by(|a, b| {
        b.stats
            .points
            .cmp(&a.stats.points)
            .then_with(|| b.stats.goal_difference().cmp(&a.stats.goal_difference()))
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, team)| TeamStanding {
            position: i + 1,
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            stats: team.stats.clone(),
            goal_difference: team.stats.goal_difference(),
        })
        .collect()
}

/// Top scorers: anyone with a goal or an assist, by goals desc then assists desc.
pub fn rank_scorers(players: &[Player]) -> Vec<PlayerStanding> {
    rank_players(
        players,
        |p| p.stats.goals > 0 || p.stats.assists > 0,
        |a, b| {
            b.stats
                .goals
                .cmp(&a.stats.goals)
                .then_with(|| b.stats.assists.cmp(&a.stats.assists))
        },
    )
}

/// Goalkeepers only, by clean sheets desc then saves desc.
pub fn rank_goalkeepers(players: &[Player]) -> Vec<PlayerStanding> {
    rank_players(
        players,
        |p| p.role == PlayerRole::Goalkeeper,
        |a, b| {
            b.stats
                .clean_sheets
                .cmp(&a.stats.clean_sheets)
                .then_with(|| b.stats.saves.cmp(&a.stats.saves))
        },
    )
}

/// Cricket batting table: runs desc, then wickets desc.
pub fn rank_run_scorers(players: &[Player]) -> Vec<PlayerStanding> {
    rank_players(
        players,
        |p| p.stats.runs > 0,
        |a, b| {
            b.stats
                .runs
                .cmp(&a.stats.runs)
                .then_with(|| b.stats.wickets.cmp(&a.stats.wickets))
        },
    )
}

/// Cricket bowling table: wickets desc, then catches desc.
pub fn rank_wicket_takers(players: &[Player]) -> Vec<PlayerStanding> {
    rank_players(
        players,
        |p| p.stats.wickets > 0,
        |a, b| {
            b.stats
                .wickets
                .cmp(&a.stats.wickets)
                .then_with(|| b.stats.catches.cmp(&a.stats.catches))
        },
    )
}

fn rank_players<F, C>(players: &[Player], keep: F, compare: C) -> Vec<PlayerStanding>
where
    F: Fn(&Player) -> bool,
    C: Fn(&Player, &Player) -> Ordering,
{
    let mut ranked: Vec<&Player> = players.iter().filter(|p| keep(*p)).collect();
    ranked.sort_by(|a, b| compare(*a, *b));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, player)| PlayerStanding {
            position: i + 1,
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            team_id: player.team_id.clone(),
            role: player.role,
            stats: player.stats.clone(),
        })
        .collect()
}

/// Everything a standings screen shows after one stats refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsBoard {
    pub teams: Vec<TeamStanding>,
    pub top_scorers: Vec<PlayerStanding>,
    pub goalkeepers: Vec<PlayerStanding>,
    pub run_scorers: Vec<PlayerStanding>,
    pub wicket_takers: Vec<PlayerStanding>,
}

impl StandingsBoard {
    /// Build a fresh board. Holds no state between calls; the caller swaps
    /// the whole board in on every update.
    pub fn compute(teams: &[Team], players: &[Player]) -> Self {
        let board = Self {
            teams: rank_teams(teams),
            top_scorers: rank_scorers(players),
            goalkeepers: rank_goalkeepers(players),
            run_scorers: rank_run_scorers(players),
            wicket_takers: rank_wicket_takers(players),
        };
        tracing::debug!(
            "Computed standings: {} teams, {} scorers, {} goalkeepers",
            board.teams.len(),
            board.top_scorers.len(),
            board.goalkeepers.len()
        );
        board
    }
}
