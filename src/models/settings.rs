//! Application settings singleton: scoring, pairing defaults, current tournament.

use crate::models::error::{TournamentError, TournamentResult};
use crate::models::game::MatchFormat;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How the roster is split into teams.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStrategy {
    /// One tier-A and one tier-B player per team.
    #[default]
    BalancedAB,
    /// Tier-A players only.
    SkillA,
    /// Tier-B players only.
    SkillB,
    /// Everyone, shuffled together.
    Mixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub pairing_strategy: PairingStrategy,
    pub match_format: MatchFormat,
    pub points_win: i32,
    pub points_tie_break_loss: i32,
    pub points_loss: i32,
    pub points_draw: i32,
    pub allow_draws_in_unlimited_set: bool,
    pub current_tournament_id: Option<TournamentId>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pairing_strategy: PairingStrategy::BalancedAB,
            match_format: MatchFormat::BestOfThree,
            points_win: 3,
            points_tie_break_loss: 1,
            points_loss: 0,
            points_draw: 1,
            allow_draws_in_unlimited_set: true,
            current_tournament_id: None,
            updated_at: Utc::now(),
        }
    }
}

/// Typed partial update: only the fields that are `Some` change.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub pairing_strategy: Option<PairingStrategy>,
    pub match_format: Option<MatchFormat>,
    pub points_win: Option<i32>,
    pub points_tie_break_loss: Option<i32>,
    pub points_loss: Option<i32>,
    pub points_draw: Option<i32>,
    pub allow_draws_in_unlimited_set: Option<bool>,
}

fn parse_value<T: DeserializeOwned>(name: &str, value: serde_json::Value) -> TournamentResult<T> {
    serde_json::from_value(value)
        .map_err(|e| TournamentError::validation(format!("invalid value for setting '{}': {}", name, e)))
}

impl SettingsUpdate {
    /// Build an update for a single setting addressed by name (snake_case field name).
    pub fn from_named(name: &str, value: serde_json::Value) -> TournamentResult<Self> {
        let mut update = SettingsUpdate::default();
        match name {
            "pairing_strategy" => update.pairing_strategy = Some(parse_value(name, value)?),
            "match_format" => update.match_format = Some(parse_value(name, value)?),
            "points_win" => update.points_win = Some(parse_value(name, value)?),
            "points_tie_break_loss" => update.points_tie_break_loss = Some(parse_value(name, value)?),
            "points_loss" => update.points_loss = Some(parse_value(name, value)?),
            "points_draw" => update.points_draw = Some(parse_value(name, value)?),
            "allow_draws_in_unlimited_set" => {
                update.allow_draws_in_unlimited_set = Some(parse_value(name, value)?)
            }
            other => {
                return Err(TournamentError::validation(format!("unknown setting '{}'", other)));
            }
        }
        Ok(update)
    }

    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(v) = self.pairing_strategy {
            settings.pairing_strategy = v;
        }
        if let Some(v) = self.match_format {
            settings.match_format = v;
        }
        if let Some(v) = self.points_win {
            settings.points_win = v;
        }
        if let Some(v) = self.points_tie_break_loss {
            settings.points_tie_break_loss = v;
        }
        if let Some(v) = self.points_loss {
            settings.points_loss = v;
        }
        if let Some(v) = self.points_draw {
            settings.points_draw = v;
        }
        if let Some(v) = self.allow_draws_in_unlimited_set {
            settings.allow_draws_in_unlimited_set = v;
        }
    }
}
