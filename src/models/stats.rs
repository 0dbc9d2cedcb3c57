//! Stats counters, per-tournament stats rows and ranked standings.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use uuid::Uuid;

/// Aggregate counters shared by stats rows, player totals and standings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatCounters {
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_drawn: u32,
    pub matches_lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: i32,
}

/// Field-wise saturating addition.
impl AddAssign for StatCounters {
    fn add_assign(&mut self, other: Self) {
        self.matches_played = self.matches_played.saturating_add(other.matches_played);
        self.matches_won = self.matches_won.saturating_add(other.matches_won);
        self.matches_drawn = self.matches_drawn.saturating_add(other.matches_drawn);
        self.matches_lost = self.matches_lost.saturating_add(other.matches_lost);
        self.sets_won = self.sets_won.saturating_add(other.sets_won);
        self.sets_lost = self.sets_lost.saturating_add(other.sets_lost);
        self.games_won = self.games_won.saturating_add(other.games_won);
        self.games_lost = self.games_lost.saturating_add(other.games_lost);
        self.points = self.points.saturating_add(other.points);
    }
}

impl<'a> std::iter::Sum<&'a StatCounters> for StatCounters {
    fn sum<I: Iterator<Item = &'a StatCounters>>(iter: I) -> Self {
        iter.fold(StatCounters::default(), |mut acc, c| {
            acc += *c;
            acc
        })
    }
}

/// `won / lost`, +inf when only `won` is non-zero, 0 when both are zero.
fn ratio(won: u32, lost: u32) -> f64 {
    if lost == 0 {
        if won > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        f64::from(won) / f64::from(lost)
    }
}

impl StatCounters {
    /// Percentage of matches won, 0 when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        f64::from(self.matches_won) / f64::from(self.matches_played) * 100.0
    }

    pub fn set_ratio(&self) -> f64 {
        ratio(self.sets_won, self.sets_lost)
    }

    pub fn game_ratio(&self) -> f64 {
        ratio(self.games_won, self.games_lost)
    }

    pub fn average_points_per_match(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        f64::from(self.points) / f64::from(self.matches_played)
    }

    pub fn performance_level(&self) -> PerformanceLevel {
        let win_rate = self.win_rate();
        if win_rate >= 80.0 {
            PerformanceLevel::Excellent
        } else if win_rate >= 65.0 {
            PerformanceLevel::VeryGood
        } else if win_rate >= 50.0 {
            PerformanceLevel::Good
        } else if win_rate >= 35.0 {
            PerformanceLevel::Average
        } else {
            PerformanceLevel::Poor
        }
    }

    /// At least three matches and a win rate of 60% or more.
    pub fn in_good_form(&self) -> bool {
        self.matches_played >= 3 && self.win_rate() >= 60.0
    }
}

/// Win-rate band used on player cards.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Poor,
    Average,
    Good,
    VeryGood,
    Excellent,
}

/// One row per (player, tournament). Rebuilt in full by every recomputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    #[serde(flatten)]
    pub counters: StatCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerStats {
    /// Zeroed row for a roster member.
    pub fn new(player_id: PlayerId, tournament_id: TournamentId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            player_id,
            tournament_id,
            counters: StatCounters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.counters.win_rate()
    }

    pub fn set_ratio(&self) -> f64 {
        self.counters.set_ratio()
    }
}

/// Primary ranking key for standings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSortBy {
    #[default]
    Points,
    MatchesWon,
    WinRate,
    SetsWon,
}

/// A ranked standings line (per tournament or overall).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based position after sorting.
    pub rank: usize,
    pub player_id: PlayerId,
    pub full_name: String,
    pub display_name: String,
    #[serde(flatten)]
    pub counters: StatCounters,
    pub win_rate: f64,
    /// Serialized as `null` when infinite.
    pub set_ratio: f64,
    /// Serialized as `null` when infinite.
    pub game_ratio: f64,
    pub average_points: f64,
    pub performance_level: PerformanceLevel,
    pub in_good_form: bool,
}

impl Standing {
    /// Unranked line with every metric derived from `counters`.
    pub fn new(player_id: PlayerId, full_name: String, display_name: String, counters: StatCounters) -> Self {
        Self {
            rank: 0,
            player_id,
            full_name,
            display_name,
            counters,
            win_rate: counters.win_rate(),
            set_ratio: counters.set_ratio(),
            game_ratio: counters.game_ratio(),
            average_points: counters.average_points_per_match(),
            performance_level: counters.performance_level(),
            in_good_form: counters.in_good_form(),
        }
    }
}
