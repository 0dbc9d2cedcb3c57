//! Data structures for the padel tournament: players, tournaments, matches, stats, settings.

mod error;
mod game;
mod player;
mod settings;
mod stats;
mod tournament;

pub use error::{EntityKind, TournamentError, TournamentResult};
pub use game::{GameMatch, MatchFormat, MatchId, MatchStatus, Score, SetScore, Side, Team, TeamId};
pub use player::{NewPlayer, Player, PlayerId, PlayerUpdate, SkillLevel};
pub use settings::{AppSettings, PairingStrategy, SettingsUpdate};
pub use stats::{PerformanceLevel, PlayerStats, Standing, StatCounters, StatsSortBy};
pub use tournament::{
    Membership, NewTournament, Tournament, TournamentId, TournamentStatus, TournamentUpdate,
    MIN_PLAYERS_TO_START,
};
