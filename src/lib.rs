//! Padel tournament web app: library with models, store and business logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use models::{
    AppSettings, EntityKind, GameMatch, MatchFormat, MatchId, MatchStatus, Membership, NewPlayer,
    NewTournament, PairingStrategy, PerformanceLevel, Player, PlayerId, PlayerStats, PlayerUpdate,
    Score, SetScore, SettingsUpdate, Side, SkillLevel, Standing, StatCounters, StatsSortBy, Team,
    TeamId, Tournament, TournamentError, TournamentId, TournamentResult, TournamentStatus,
    TournamentUpdate,
};
pub use store::{Database, Store};
