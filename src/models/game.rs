//! Match (game), Team and per-set scores for 2v2 padel.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Team identity, generated each time a pair is formed.
pub type TeamId = Uuid;

/// Which side of a match a team is on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// How a match is scored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    #[default]
    BestOfThree,
    /// No set-by-set score; decided by a declared winner.
    GoldenPoint,
    /// One long set; equal scores may end in a draw.
    UnlimitedSet,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Draw,
}

impl MatchStatus {
    /// Completed and Draw are terminal; new rounds wait on the others.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Draw)
    }
}

/// Two distinct players paired for one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub player_1: PlayerId,
    pub player_2: PlayerId,
}

impl Team {
    pub fn new(player_1: PlayerId, player_2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_1,
            player_2,
        }
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.player_1, self.player_2]
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player_1 == player_id || self.player_2 == player_id
    }
}

/// One side's score in a set: a game count or the golden-point marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Numeric(u32),
    GoldenPoint,
}

impl Score {
    pub fn numeric(self) -> Option<u32> {
        match self {
            Score::Numeric(n) => Some(n),
            Score::GoldenPoint => None,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Numeric(n) => write!(f, "{}", n),
            Score::GoldenPoint => write!(f, "GP"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub set_number: u32,
    pub team_1: Score,
    pub team_2: Score,
}

impl SetScore {
    pub fn new(set_number: u32, team_1: u32, team_2: u32) -> Self {
        Self {
            set_number,
            team_1: Score::Numeric(team_1),
            team_2: Score::Numeric(team_2),
        }
    }

    /// Both sides as game counts, `None` when either side is not numeric.
    pub fn numeric_pair(&self) -> Option<(u32, u32)> {
        Some((self.team_1.numeric()?, self.team_2.numeric()?))
    }
}

/// A single match between two teams of a tournament round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: u32,
    pub team_1: Team,
    pub team_2: Team,
    #[serde(default)]
    pub scores: Vec<SetScore>,
    pub format: MatchFormat,
    pub status: MatchStatus,
    /// Set iff `status` is Completed.
    pub winner_team_id: Option<TeamId>,
    pub court: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameMatch {
    /// New Pending match with no scores.
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        team_1: Team,
        team_2: Team,
        format: MatchFormat,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            team_1,
            team_2,
            scores: Vec::new(),
            format,
            status: MatchStatus::Pending,
            winner_team_id: None,
            court: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::One => &self.team_1,
            Side::Two => &self.team_2,
        }
    }

    /// Side a team id plays on, if it belongs to this match.
    pub fn side_of_team(&self, team_id: TeamId) -> Option<Side> {
        if self.team_1.id == team_id {
            Some(Side::One)
        } else if self.team_2.id == team_id {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn player_ids(&self) -> [PlayerId; 4] {
        [
            self.team_1.player_1,
            self.team_1.player_2,
            self.team_2.player_1,
            self.team_2.player_2,
        ]
    }

    /// Short score line, e.g. "6-4 3-6 7-5" or "GP won".
    pub fn score_display(&self) -> String {
        if self.scores.is_empty() {
            return "0-0".to_string();
        }
        self.scores
            .iter()
            .map(|s| match (s.team_1, s.team_2) {
                (Score::GoldenPoint, _) => "GP won".to_string(),
                (_, Score::GoldenPoint) => "GP lost".to_string(),
                (a, b) => format!("{}-{}", a, b),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
