//! Tournament, its lifecycle status and the player membership join row.

use crate::models::player::PlayerId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Minimum roster size before a tournament can start (and generate matches).
pub const MIN_PLAYERS_TO_START: usize = 4;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

/// Tournament metadata plus the denormalized list of member ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: u32,
    pub matches_per_day: u32,
    pub max_players: usize,
    /// Round number the next generated matches get.
    pub current_round: u32,
    pub status: TournamentStatus,
    /// Set-like: no duplicates, order carries no meaning.
    pub player_ids: Vec<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a Draft tournament with default scheduling and no players.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            start_date: None,
            end_date: None,
            days: 12,
            matches_per_day: 6,
            max_players: 24,
            current_round: 1,
            status: TournamentStatus::Draft,
            player_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_player_count(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_full(&self) -> bool {
        self.current_player_count() >= self.max_players
    }

    pub fn can_start(&self) -> bool {
        self.current_player_count() >= MIN_PLAYERS_TO_START
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.player_ids.contains(&player_id)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Player ↔ tournament membership, independent of stats rows.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(tournament_id: TournamentId, player_id: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            tournament_id,
            joined_at: Utc::now(),
        }
    }
}

/// Payload for creating a tournament.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub matches_per_day: Option<u32>,
    #[serde(default)]
    pub max_players: Option<usize>,
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
}

/// Fields of a tournament that can be changed after creation.
///
/// A `player_ids` list replaces the roster: ids missing from it are removed
/// (with their stats rows), new ids join.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub matches_per_day: Option<u32>,
    pub max_players: Option<usize>,
    pub current_round: Option<u32>,
    pub status: Option<TournamentStatus>,
    pub player_ids: Option<Vec<PlayerId>>,
}
