use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FixtureError, FixtureResult};
use crate::models::{Match, MatchStatus, Team, TournamentFormat};

/// A generated but not yet persisted match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub round: u32,
    pub sequence: u32,
    pub home_team_id: String,
    pub home_team_name: String,
    pub away_team_id: String,
    pub away_team_name: String,
    pub venue: String,
    pub status: MatchStatus,
    pub match_date: Option<DateTime<Utc>>,
}

impl Fixture {
    fn between(round: u32, sequence: u32, home: &Team, away: &Team, venue: &str) -> Self {
        Self {
            round,
            sequence,
            home_team_id: home.id.clone(),
            home_team_name: home.name.clone(),
            away_team_id: away.id.clone(),
            away_team_name: away.name.clone(),
            venue: venue.to_string(),
            status: MatchStatus::Scheduled,
            match_date: None,
        }
    }

    pub fn into_match(self, tournament_id: &str) -> Match {
        let now = Utc::now();
        Match {
            id: Uuid::new_v4().to_string(),
            tournament_id: tournament_id.to_string(),
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_team_name: self.home_team_name,
            away_team_name: self.away_team_name,
            match_date: self.match_date,
            venue: self.venue,
            status: self.status,
            round: self.round,
            sequence: self.sequence,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One round of a knockout bracket before any result is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketRound<'a, T> {
    pub round: u32,
    pub pairs: Vec<(&'a T, &'a T)>,
    /// Unpaired last entrant of an odd-sized round. Advances without a match.
    pub bye: Option<&'a T>,
}

/// Shape of a single-elimination bracket, assuming the first-listed entrant
/// of every pair goes through.
///
/// This is a placeholder for the real draw: rounds after the first are
/// provisional and are expected to be re-seeded once results come in.
pub fn provisional_bracket_shape<T>(entrants: &[T]) -> Vec<BracketRound<'_, T>> {
    let mut rounds = Vec::new();
    let mut current: Vec<&T> = entrants.iter().collect();
    let mut round = 1;

    while current.len() > 1 {
        let pairs = current.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
        let bye = if current.len() % 2 == 1 {
            current.last().copied()
        } else {
            None
        };
        rounds.push(BracketRound { round, pairs, bye });

        // Even indices: the first entrant of each pair plus the bye, if any.
        current = current.iter().step_by(2).copied().collect();
        round += 1;
    }

    rounds
}

/// Every unordered pair exactly once: i ascending, then j > i ascending.
pub fn round_robin_pairs<T>(entrants: &[T]) -> Vec<(&T, &T)> {
    let mut pairs = Vec::with_capacity(entrants.len() * entrants.len().saturating_sub(1) / 2);
    for (i, home) in entrants.iter().enumerate() {
        for away in &entrants[i + 1..] {
            pairs.push((home, away));
        }
    }
    pairs
}

/// Generate the full fixture list for a tournament start.
///
/// Sequence numbers start at 1 and increase by one in generation order.
/// Fewer than two teams is not an error and yields no fixtures.
pub fn generate_schedule(
    format: TournamentFormat,
    teams: &[Team],
    venue: &str,
) -> FixtureResult<Vec<Fixture>> {
    let pairings: Vec<(u32, &Team, &Team)> = match format {
        TournamentFormat::Knockout => provisional_bracket_shape(teams)
            .into_iter()
            .flat_map(|bracket_round| {
                if let Some(team) = bracket_round.bye {
                    tracing::debug!("{} gets a bye in round {}", team.name, bracket_round.round);
                }
                let round = bracket_round.round;
                bracket_round
                    .pairs
                    .into_iter()
                    .map(move |(home, away)| (round, home, away))
            })
            .collect(),
        TournamentFormat::League => round_robin_pairs(teams)
            .into_iter()
            .map(|(home, away)| (1, home, away))
            .collect(),
        TournamentFormat::Mixed => return Err(FixtureError::UnsupportedFormat(format)),
    };

    let fixtures: Vec<Fixture> = pairings
        .into_iter()
        .zip(1..)
        .map(|((round, home, away), sequence)| Fixture::between(round, sequence, home, away, venue))
        .collect();

    tracing::debug!(
        "Generated {} {} fixtures for {} teams",
        fixtures.len(),
        format,
        teams.len()
    );

    Ok(fixtures)
}

/// Number of fixtures `generate_schedule` produces for `teams` entrants.
pub fn expected_match_count(format: TournamentFormat, teams: usize) -> FixtureResult<usize> {
    match format {
        TournamentFormat::Knockout => Ok(teams.saturating_sub(1)),
        TournamentFormat::League => Ok(teams * teams.saturating_sub(1) / 2),
        TournamentFormat::Mixed => Err(FixtureError::UnsupportedFormat(format)),
    }
}

/// Number of distinct rounds in the generated fixture list.
pub fn expected_round_count(format: TournamentFormat, teams: usize) -> FixtureResult<u32> {
    if format == TournamentFormat::Mixed {
        return Err(FixtureError::UnsupportedFormat(format));
    }
    if teams < 2 {
        return Ok(0);
    }
    match format {
        // ceil(log2(n))
        TournamentFormat::Knockout => Ok(usize::BITS - (teams - 1).leading_zeros()),
        _ => Ok(1),
    }
}
