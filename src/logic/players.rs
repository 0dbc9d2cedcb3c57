//! Player repository: registration, profile edits, search and removal.

use crate::models::{
    NewPlayer, Player, PlayerId, PlayerStats, PlayerUpdate, SkillLevel, Tournament, TournamentError,
    TournamentResult,
};
use crate::store::Database;
use chrono::Utc;

fn required(field: &str, value: &str) -> TournamentResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Empty or whitespace-only optional text is stored as `None`.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn sort_by_name(players: &mut [Player]) {
    players.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.surname.cmp(&b.surname)));
}

/// Register a player. Totals start at zero.
pub fn add_player(db: &mut Database, new: NewPlayer) -> TournamentResult<Player> {
    let mut player = Player::new(
        required("name", &new.name)?,
        required("surname", &new.surname)?,
        new.skill_level,
    );
    player.nickname = optional(new.nickname);
    player.contact = optional(new.contact);
    log::info!("Added player {} ({})", player.full_name(), player.id);
    db.insert_player(player.clone());
    Ok(player)
}

pub fn player(db: &Database, player_id: PlayerId) -> TournamentResult<Player> {
    db.player(player_id)
        .cloned()
        .ok_or_else(|| TournamentError::player_not_found(player_id))
}

/// All players ordered by name, then surname.
pub fn all_players(db: &Database) -> Vec<Player> {
    let mut players: Vec<Player> = db.players().cloned().collect();
    sort_by_name(&mut players);
    players
}

/// Edit profile fields. Totals stay as the stats engine left them.
pub fn update_player(db: &mut Database, player_id: PlayerId, update: PlayerUpdate) -> TournamentResult<Player> {
    let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
    let surname = update.surname.as_deref().map(|s| required("surname", s)).transpose()?;

    let player = db
        .player_mut(player_id)
        .ok_or_else(|| TournamentError::player_not_found(player_id))?;
    if let Some(name) = name {
        player.name = name;
    }
    if let Some(surname) = surname {
        player.surname = surname;
    }
    if update.nickname.is_some() {
        player.nickname = optional(update.nickname);
    }
    if update.contact.is_some() {
        player.contact = optional(update.contact);
    }
    if let Some(level) = update.skill_level {
        player.skill_level = level;
    }
    player.updated_at = Utc::now();
    Ok(player.clone())
}

/// Delete a player with their memberships and stats rows, and scrub their
/// id from every tournament roster. Returns false if the player did not exist.
pub fn delete_player(db: &mut Database, player_id: PlayerId) -> bool {
    let Some(player) = db.remove_player(player_id) else {
        return false;
    };
    db.remove_memberships_where(|m| m.player_id == player_id);
    let stats_removed = db.remove_stats_where(|s| s.player_id == player_id);
    for tournament in db.tournaments_mut() {
        if tournament.has_player(player_id) {
            tournament.player_ids.retain(|id| *id != player_id);
            tournament.touch();
        }
    }
    log::info!(
        "Deleted player {} ({} stats rows removed)",
        player.full_name(),
        stats_removed
    );
    true
}

/// Case-insensitive search on name, surname and nickname, optionally filtered by tier.
pub fn search_players(db: &Database, term: &str, skill_level: Option<SkillLevel>) -> Vec<Player> {
    let term = term.trim();
    let mut players: Vec<Player> = db
        .players()
        .filter(|p| term.is_empty() || p.matches_search(term))
        .filter(|p| skill_level.map_or(true, |level| p.skill_level == level))
        .cloned()
        .collect();
    sort_by_name(&mut players);
    players
}

/// Tournaments the player has joined, newest first.
pub fn player_tournaments(db: &Database, player_id: PlayerId) -> TournamentResult<Vec<Tournament>> {
    if db.player(player_id).is_none() {
        return Err(TournamentError::player_not_found(player_id));
    }
    let mut tournaments: Vec<Tournament> = db
        .tournaments_of(player_id)
        .into_iter()
        .filter_map(|id| db.tournament(id).cloned())
        .collect();
    tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tournaments)
}

/// The player's per-tournament stats rows, newest tournament first.
pub fn player_stats(db: &Database, player_id: PlayerId) -> TournamentResult<Vec<PlayerStats>> {
    if db.player(player_id).is_none() {
        return Err(TournamentError::player_not_found(player_id));
    }
    let mut rows: Vec<PlayerStats> = db.stats_for_player(player_id).into_iter().cloned().collect();
    rows.sort_by_key(|row| {
        std::cmp::Reverse(db.tournament(row.tournament_id).map(|t| t.created_at))
    });
    Ok(rows)
}
