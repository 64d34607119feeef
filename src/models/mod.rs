use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FixtureError;

pub mod raw;

pub use raw::{parse_live_snapshot, RawLiveScore, RawPlayerStats, RawTeamStats};

/// Declares a store-facing enum that round-trips through its
/// SCREAMING_SNAKE_CASE name ("IN_PROGRESS", "WICKET_KEEPER", ...).
macro_rules! store_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FixtureError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(FixtureError::InvalidInput(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

store_enum!(Sport {
    Cricket => "CRICKET",
    Football => "FOOTBALL",
});

store_enum!(
    /// MIXED is accepted by the store but has no generator.
    TournamentFormat {
        Knockout => "KNOCKOUT",
        League => "LEAGUE",
        Mixed => "MIXED",
    }
);

store_enum!(TournamentStatus {
    Upcoming => "UPCOMING",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

store_enum!(MatchStatus {
    Scheduled => "SCHEDULED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

store_enum!(PlayerRole {
    Batsman => "BATSMAN",
    Bowler => "BOWLER",
    AllRounder => "ALL_ROUNDER",
    WicketKeeper => "WICKET_KEEPER",
    Goalkeeper => "GOALKEEPER",
    Defender => "DEFENDER",
    Midfielder => "MIDFIELDER",
    Forward => "FORWARD",
});

impl PlayerRole {
    pub fn sport(&self) -> Sport {
        match self {
            PlayerRole::Batsman
            | PlayerRole::Bowler
            | PlayerRole::AllRounder
            | PlayerRole::WicketKeeper => Sport::Cricket,
            _ => Sport::Football,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamStats {
    /// Always derived from the two goal columns, never read from the store.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    // Cricket
    pub runs: u32,
    pub wickets: u32,
    pub catches: u32,
    // Football
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub clean_sheets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub role: PlayerRole,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub sport: Sport,
    pub players: Vec<Player>,
    pub stats: TeamStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub tournament_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_team_name: String,
    pub away_team_name: String,
    pub match_date: Option<DateTime<Utc>>, // None until the organiser fixes a date
    pub venue: String,
    pub status: MatchStatus,
    pub round: u32,
    pub sequence: u32,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub sport: Sport,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub max_teams: u32,
    pub current_round: u32,
    pub team_ids: Vec<String>,
    pub rules: Option<String>,
    pub prize_pool: Option<String>,
    pub venue: String,
    pub organizer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentDetail {
    pub tournament: Tournament,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub position: usize,
    pub team_id: String,
    pub team_name: String,
    pub stats: TeamStats,
    pub goal_difference: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub position: usize,
    pub player_id: String,
    pub player_name: String,
    pub team_id: String,
    pub role: PlayerRole,
    pub stats: PlayerStats,
}

/// One side of a live scoreboard. `wickets` and `balls` stay zero for football.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideScore {
    pub score: u32,
    pub wickets: u32,
    pub balls: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveScore {
    pub match_id: String,
    pub status: MatchStatus,
    pub home: SideScore,
    pub away: SideScore,
    pub result: Option<String>,
}

// API Response types
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_store_strings() {
        assert_eq!("IN_PROGRESS".parse::<TournamentStatus>().unwrap(), TournamentStatus::InProgress);
        assert_eq!("wicket-keeper".parse::<PlayerRole>().unwrap(), PlayerRole::WicketKeeper);
        assert_eq!(TournamentFormat::Mixed.to_string(), "MIXED");
        assert!("ROUND_ROBIN".parse::<TournamentFormat>().is_err());
    }

    #[test]
    fn enums_serialize_as_store_strings() {
        let json = serde_json::to_string(&MatchStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let role: PlayerRole = serde_json::from_str("\"ALL_ROUNDER\"").unwrap();
        assert_eq!(role, PlayerRole::AllRounder);
    }

    #[test]
    fn goal_difference_can_be_negative() {
        let stats = TeamStats {
            goals_for: 2,
            goals_against: 7,
            ..Default::default()
        };
        assert_eq!(stats.goal_difference(), -5);
    }

    #[test]
    fn roles_know_their_sport() {
        assert_eq!(PlayerRole::Bowler.sport(), Sport::Cricket);
        assert_eq!(PlayerRole::Goalkeeper.sport(), Sport::Football);
    }
}
