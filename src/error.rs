use thiserror::Error;

use crate::models::{MatchStatus, TournamentFormat, TournamentStatus};

pub type FixtureResult<T> = std::result::Result<T, FixtureError>;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported tournament format: {0}")]
    UnsupportedFormat(TournamentFormat),

    #[error("tournament cannot move from {from} to {to}")]
    InvalidTournamentTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },

    #[error("match cannot move from {from} to {to}")]
    InvalidMatchTransition { from: MatchStatus, to: MatchStatus },

    #[error("tournament not found: {0}")]
    TournamentNotFound(String),

    #[error("match not found: {0}")]
    MatchNotFound(String),

    /// Raised when the match list and the status update did not land together.
    #[error("partial persistence for tournament {tournament_id}: {detail}")]
    PartialPersistence { tournament_id: String, detail: String },

    /// A conditional status write found the row no longer in the status it was read in.
    #[error("{entity} {id} is no longer {expected}, retry with fresh data")]
    StaleStatus {
        entity: &'static str,
        id: String,
        expected: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl FixtureError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FixtureError::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        FixtureError::InvalidInput(format!("malformed record: {}", err))
    }
}
