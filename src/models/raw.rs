//! Partial records as they arrive from the document store or a live-score push.
//!
//! Every field may be missing. Conversion into the typed records in
//! [`crate::models`] fills gaps with zero and rejects negative counts, so the
//! ranking code downstream only ever sees complete numeric records.

use serde::{Deserialize, Serialize};

use super::{LiveScore, MatchStatus, PlayerStats, SideScore, TeamStats};
use crate::error::{FixtureError, FixtureResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTeamStats {
    pub matches_played: Option<i64>,
    pub wins: Option<i64>,
    pub draws: Option<i64>,
    pub losses: Option<i64>,
    pub points: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPlayerStats {
    pub runs: Option<i64>,
    pub wickets: Option<i64>,
    pub catches: Option<i64>,
    pub goals: Option<i64>,
    pub assists: Option<i64>,
    pub yellow_cards: Option<i64>,
    pub red_cards: Option<i64>,
    pub saves: Option<i64>,
    pub clean_sheets: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLiveScore {
    pub status: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub home_wickets: Option<i64>,
    pub away_wickets: Option<i64>,
    pub home_balls: Option<i64>,
    pub away_balls: Option<i64>,
    pub result: Option<String>,
}

fn count(field: &str, value: Option<i64>) -> FixtureResult<u32> {
    match value {
        None => Ok(0),
        Some(v) => u32::try_from(v)
            .map_err(|_| FixtureError::invalid(format!("{} out of range: {}", field, v))),
    }
}

impl TryFrom<RawTeamStats> for TeamStats {
    type Error = FixtureError;

    fn try_from(raw: RawTeamStats) -> FixtureResult<Self> {
        Ok(TeamStats {
            matches_played: count("matches_played", raw.matches_played)?,
            wins: count("wins", raw.wins)?,
            draws: count("draws", raw.draws)?,
            losses: count("losses", raw.losses)?,
            points: count("points", raw.points)?,
            goals_for: count("goals_for", raw.goals_for)?,
            goals_against: count("goals_against", raw.goals_against)?,
        })
    }
}

impl TryFrom<RawPlayerStats> for PlayerStats {
    type Error = FixtureError;

    fn try_from(raw: RawPlayerStats) -> FixtureResult<Self> {
        Ok(PlayerStats {
            runs: count("runs", raw.runs)?,
            wickets: count("wickets", raw.wickets)?,
            catches: count("catches", raw.catches)?,
            goals: count("goals", raw.goals)?,
            assists: count("assists", raw.assists)?,
            yellow_cards: count("yellow_cards", raw.yellow_cards)?,
            red_cards: count("red_cards", raw.red_cards)?,
            saves: count("saves", raw.saves)?,
            clean_sheets: count("clean_sheets", raw.clean_sheets)?,
        })
    }
}

impl RawLiveScore {
    pub fn into_live_score(self, match_id: &str) -> FixtureResult<LiveScore> {
        let status = match self.status.as_deref() {
            Some(s) => s.parse::<MatchStatus>()?,
            None => MatchStatus::Scheduled,
        };

        Ok(LiveScore {
            match_id: match_id.to_string(),
            status,
            home: SideScore {
                score: count("home_score", self.home_score)?,
                wickets: count("home_wickets", self.home_wickets)?,
                balls: count("home_balls", self.home_balls)?,
            },
            away: SideScore {
                score: count("away_score", self.away_score)?,
                wickets: count("away_wickets", self.away_wickets)?,
                balls: count("away_balls", self.away_balls)?,
            },
            result: self.result.filter(|r| !r.trim().is_empty()),
        })
    }
}

/// Parse one push snapshot for a match document into a full [`LiveScore`].
///
/// The snapshot replaces whatever was shown before; nothing is merged with
/// an earlier snapshot.
pub fn parse_live_snapshot(match_id: &str, snapshot: &serde_json::Value) -> FixtureResult<LiveScore> {
    if !snapshot.is_object() {
        return Err(FixtureError::invalid(format!(
            "live snapshot for {} is not an object",
            match_id
        )));
    }
    let raw: RawLiveScore = serde_json::from_value(snapshot.clone())?;
    raw.into_live_score(match_id)
}
