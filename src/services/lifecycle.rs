use crate::error::{FixtureError, FixtureResult};
use crate::models::{Match, MatchStatus, Sport, Team, Tournament, TournamentStatus};
use crate::services::scheduler::{generate_schedule, Fixture};

impl TournamentStatus {
    /// Forward only, one step at a time.
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        matches!(
            (self, next),
            (TournamentStatus::Upcoming, TournamentStatus::InProgress)
                | (TournamentStatus::InProgress, TournamentStatus::Completed)
        )
    }

    pub fn transition_to(&self, next: TournamentStatus) -> FixtureResult<TournamentStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(FixtureError::InvalidTournamentTransition { from: *self, to: next })
        }
    }
}

impl MatchStatus {
    /// Forward only, one step at a time.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (MatchStatus::Scheduled, MatchStatus::InProgress)
                | (MatchStatus::InProgress, MatchStatus::Completed)
        )
    }

    pub fn transition_to(&self, next: MatchStatus) -> FixtureResult<MatchStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(FixtureError::InvalidMatchTransition { from: *self, to: next })
        }
    }
}

/// Everything the store has to write, in one unit, to start a tournament.
#[derive(Debug, Clone)]
pub struct StartPlan {
    pub tournament_id: String,
    pub fixtures: Vec<Fixture>,
    pub next_status: TournamentStatus,
    pub current_round: u32,
}

impl StartPlan {
    pub fn into_matches(self) -> Vec<Match> {
        let tournament_id = self.tournament_id;
        self.fixtures
            .into_iter()
            .map(|fixture| fixture.into_match(&tournament_id))
            .collect()
    }
}

/// Validate a start request and generate its fixtures.
///
/// `existing_matches` is the number of matches the store already holds for
/// this tournament; anything other than zero means a previous start landed.
pub fn plan_start(
    tournament: &Tournament,
    teams: &[Team],
    existing_matches: usize,
) -> FixtureResult<StartPlan> {
    let next_status = tournament.status.transition_to(TournamentStatus::InProgress)?;

    if existing_matches > 0 {
        return Err(FixtureError::PartialPersistence {
            tournament_id: tournament.id.clone(),
            detail: format!(
                "{} matches already stored while status is {}",
                existing_matches, tournament.status
            ),
        });
    }
    if teams.len() < 2 {
        return Err(FixtureError::invalid(format!(
            "tournament {} needs at least 2 teams to start, has {}",
            tournament.name,
            teams.len()
        )));
    }
    if tournament.max_teams > 0 && teams.len() > tournament.max_teams as usize {
        return Err(FixtureError::invalid(format!(
            "tournament {} allows {} teams, has {}",
            tournament.name,
            tournament.max_teams,
            teams.len()
        )));
    }

    let fixtures = generate_schedule(tournament.format, teams, &tournament.venue)?;

    Ok(StartPlan {
        tournament_id: tournament.id.clone(),
        fixtures,
        next_status,
        current_round: 1,
    })
}

/// League points for one side of a finished match.
///
/// Football: 3 for a win, 1 for a draw. Cricket: 2 for a win, 1 for a tie.
pub fn points_for(sport: Sport, scored: u32, conceded: u32) -> u32 {
    let win = match sport {
        Sport::Football => 3,
        Sport::Cricket => 2,
    };
    match scored.cmp(&conceded) {
        std::cmp::Ordering::Greater => win,
        std::cmp::Ordering::Equal => 1,
        std::cmp::Ordering::Less => 0,
    }
}

/// Free-text result shown once a match is completed.
pub fn result_summary(match_data: &Match, home_score: u32, away_score: u32) -> String {
    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => format!(
            "{} won {}-{}",
            match_data.home_team_name, home_score, away_score
        ),
        std::cmp::Ordering::Less => format!(
            "{} won {}-{}",
            match_data.away_team_name, away_score, home_score
        ),
        std::cmp::Ordering::Equal => format!("Draw {}-{}", home_score, away_score),
    }
}
