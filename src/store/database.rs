//! In-memory tables with collection-level CRUD and the membership join.
//!
//! Relationship maintenance (cascades, denormalized id lists) lives in
//! `logic`; this layer only stores and queries rows.

use crate::models::{
    AppSettings, GameMatch, MatchId, Membership, Player, PlayerId, PlayerStats, Tournament,
    TournamentId,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    players: HashMap<PlayerId, Player>,
    #[serde(default)]
    tournaments: HashMap<TournamentId, Tournament>,
    #[serde(default)]
    matches: HashMap<MatchId, GameMatch>,
    /// Unique per (player_id, tournament_id).
    #[serde(default)]
    stats: Vec<PlayerStats>,
    #[serde(default)]
    memberships: Vec<Membership>,
    #[serde(default)]
    settings: Option<AppSettings>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // Players

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    // Tournaments

    pub fn insert_tournament(&mut self, tournament: Tournament) {
        self.tournaments.insert(tournament.id, tournament);
    }

    pub fn tournament(&self, id: TournamentId) -> Option<&Tournament> {
        self.tournaments.get(&id)
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Option<&mut Tournament> {
        self.tournaments.get_mut(&id)
    }

    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    pub fn tournaments_mut(&mut self) -> impl Iterator<Item = &mut Tournament> {
        self.tournaments.values_mut()
    }

    pub fn remove_tournament(&mut self, id: TournamentId) -> Option<Tournament> {
        self.tournaments.remove(&id)
    }

    // Matches

    pub fn insert_match(&mut self, game: GameMatch) {
        self.matches.insert(game.id, game);
    }

    pub fn game(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.get(&id)
    }

    pub fn game_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.get_mut(&id)
    }

    /// Matches of one tournament ordered by round, then creation time.
    pub fn matches_for_tournament(&self, tournament_id: TournamentId) -> Vec<&GameMatch> {
        let mut matches: Vec<_> = self
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .collect();
        matches.sort_by_key(|m| (m.round, m.created_at));
        matches
    }

    pub fn remove_match(&mut self, id: MatchId) -> Option<GameMatch> {
        self.matches.remove(&id)
    }

    /// Remove every match the predicate selects; returns how many went.
    pub fn remove_matches_where(&mut self, mut pred: impl FnMut(&GameMatch) -> bool) -> usize {
        let before = self.matches.len();
        self.matches.retain(|_, m| !pred(m));
        before - self.matches.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    // Player stats

    pub fn stats_row(&self, player_id: PlayerId, tournament_id: TournamentId) -> Option<&PlayerStats> {
        self.stats
            .iter()
            .find(|s| s.player_id == player_id && s.tournament_id == tournament_id)
    }

    /// Overwrite the counters of the existing (player, tournament) row, or insert the row.
    pub fn upsert_stats(&mut self, row: PlayerStats) {
        match self
            .stats
            .iter_mut()
            .find(|s| s.player_id == row.player_id && s.tournament_id == row.tournament_id)
        {
            Some(existing) => {
                existing.counters = row.counters;
                existing.updated_at = Utc::now();
            }
            None => self.stats.push(row),
        }
    }

    pub fn stats_for_tournament(&self, tournament_id: TournamentId) -> Vec<&PlayerStats> {
        self.stats
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .collect()
    }

    pub fn stats_for_player(&self, player_id: PlayerId) -> Vec<&PlayerStats> {
        self.stats.iter().filter(|s| s.player_id == player_id).collect()
    }

    pub fn all_stats(&self) -> &[PlayerStats] {
        &self.stats
    }

    /// Remove stats rows the predicate selects; returns how many went.
    pub fn remove_stats_where(&mut self, mut pred: impl FnMut(&PlayerStats) -> bool) -> usize {
        let before = self.stats.len();
        self.stats.retain(|s| !pred(s));
        before - self.stats.len()
    }

    // Memberships

    /// Add the join row if missing. Returns false when it already existed.
    pub fn add_membership(&mut self, tournament_id: TournamentId, player_id: PlayerId) -> bool {
        if self.is_member(tournament_id, player_id) {
            return false;
        }
        self.memberships.push(Membership::new(tournament_id, player_id));
        true
    }

    pub fn remove_membership(&mut self, tournament_id: TournamentId, player_id: PlayerId) -> bool {
        let before = self.memberships.len();
        self.memberships
            .retain(|m| !(m.tournament_id == tournament_id && m.player_id == player_id));
        before != self.memberships.len()
    }

    pub fn is_member(&self, tournament_id: TournamentId, player_id: PlayerId) -> bool {
        self.memberships
            .iter()
            .any(|m| m.tournament_id == tournament_id && m.player_id == player_id)
    }

    /// Player ids joined to a tournament, in join order.
    pub fn members_of(&self, tournament_id: TournamentId) -> Vec<PlayerId> {
        self.memberships
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .map(|m| m.player_id)
            .collect()
    }

    pub fn tournaments_of(&self, player_id: PlayerId) -> Vec<TournamentId> {
        self.memberships
            .iter()
            .filter(|m| m.player_id == player_id)
            .map(|m| m.tournament_id)
            .collect()
    }

    pub fn remove_memberships_where(&mut self, mut pred: impl FnMut(&Membership) -> bool) -> usize {
        let before = self.memberships.len();
        self.memberships.retain(|m| !pred(m));
        before - self.memberships.len()
    }

    pub fn membership_count(&self) -> usize {
        self.memberships.len()
    }

    // Settings

    pub fn settings(&self) -> Option<&AppSettings> {
        self.settings.as_ref()
    }

    /// The settings row, created with defaults on first access.
    pub fn settings_or_default(&mut self) -> &mut AppSettings {
        self.settings.get_or_insert_with(AppSettings::default)
    }

    pub fn replace_settings(&mut self, settings: AppSettings) {
        self.settings = Some(settings);
    }
}
