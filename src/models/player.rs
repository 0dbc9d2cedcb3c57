//! Player, skill tier and the create/update payloads.

use crate::models::stats::StatCounters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in teams, memberships and stats rows).
pub type PlayerId = Uuid;

/// Coarse skill bucket used to balance team formation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    /// Upper tier.
    TierA,
    /// Middle/lower tier.
    TierB,
    #[default]
    Unassigned,
}

/// A registered player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub surname: String,
    pub nickname: Option<String>,
    pub contact: Option<String>,
    pub skill_level: SkillLevel,
    /// Lifetime totals: always the sum of the player's stats rows, rewritten by recomputation.
    #[serde(default)]
    pub totals: StatCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Create a new player. Totals start at zero.
    pub fn new(name: impl Into<String>, surname: impl Into<String>, skill_level: SkillLevel) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            surname: surname.into(),
            nickname: None,
            contact: None,
            skill_level,
            totals: StatCounters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Nickname when set, full name otherwise.
    pub fn display_name(&self) -> String {
        match self.nickname.as_deref() {
            Some(nick) if !nick.trim().is_empty() => nick.to_string(),
            _ => self.full_name(),
        }
    }

    /// Case-insensitive substring match on name, surname or nickname.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.surname.to_lowercase().contains(&term)
            || self
                .nickname
                .as_ref()
                .is_some_and(|n| n.to_lowercase().contains(&term))
    }
}

/// Payload for registering a player.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

/// Editable profile fields. Totals are never edited by hand.
///
/// An empty `nickname` or `contact` clears the field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nickname: Option<String>,
    pub contact: Option<String>,
    pub skill_level: Option<SkillLevel>,
}
