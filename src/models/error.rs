//! Error taxonomy shared by every tournament operation.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Kind of entity a lookup failed for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Tournament,
    Match,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Player => write!(f, "Player"),
            EntityKind::Tournament => write!(f, "Tournament"),
            EntityKind::Match => write!(f, "Match"),
        }
    }
}

/// Errors that can occur during tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// A player, tournament or match id does not exist.
    #[error("{0} with ID {1} not found")]
    NotFound(EntityKind, Uuid),

    /// Matches cannot be generated while earlier ones are still open.
    #[error("Cannot generate new matches while there are {uncompleted} uncompleted matches")]
    Conflict { uncompleted: usize },

    #[error("At least {needed} players are required to generate matches (have {current})")]
    InsufficientPlayers { needed: usize, current: usize },

    /// The pairing strategy could not form two teams from the roster.
    #[error("Not enough teams could be formed with the selected strategy ({formed} formed)")]
    InsufficientTeams { formed: usize },

    /// Malformed input: bad settings name/type, bad team, illegal draw.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

impl TournamentError {
    pub fn player_not_found(id: Uuid) -> Self {
        TournamentError::NotFound(EntityKind::Player, id)
    }

    pub fn tournament_not_found(id: Uuid) -> Self {
        TournamentError::NotFound(EntityKind::Tournament, id)
    }

    pub fn match_not_found(id: Uuid) -> Self {
        TournamentError::NotFound(EntityKind::Match, id)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TournamentError::Validation(message.into())
    }
}

/// Result type for tournament operations.
pub type TournamentResult<T> = Result<T, TournamentError>;
