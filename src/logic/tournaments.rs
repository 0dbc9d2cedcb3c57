//! Tournament repository: CRUD plus roster (membership) maintenance.

use crate::logic::settings::clear_current_tournament;
use crate::logic::stats::update_player_totals;
use crate::models::{
    GameMatch, NewTournament, Player, PlayerId, PlayerStats, Tournament, TournamentError, TournamentId,
    TournamentResult, TournamentUpdate,
};
use crate::store::Database;

pub fn tournament(db: &Database, tournament_id: TournamentId) -> TournamentResult<Tournament> {
    db.tournament(tournament_id)
        .cloned()
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))
}

/// All tournaments, newest first.
pub fn all_tournaments(db: &Database) -> Vec<Tournament> {
    let mut tournaments: Vec<Tournament> = db.tournaments().cloned().collect();
    tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tournaments
}

/// Create a Draft tournament at round 1. Initial player ids become members.
pub fn create_tournament(db: &mut Database, new: NewTournament) -> TournamentResult<Tournament> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(TournamentError::validation("tournament name must not be empty"));
    }
    for player_id in &new.player_ids {
        if db.player(*player_id).is_none() {
            return Err(TournamentError::player_not_found(*player_id));
        }
    }

    let mut tournament = Tournament::new(name);
    tournament.description = new.description;
    tournament.start_date = new.start_date;
    tournament.end_date = new.end_date;
    if let Some(days) = new.days {
        tournament.days = days;
    }
    if let Some(per_day) = new.matches_per_day {
        tournament.matches_per_day = per_day;
    }
    if let Some(max) = new.max_players {
        tournament.max_players = max;
    }
    for player_id in new.player_ids {
        if !tournament.has_player(player_id) {
            tournament.player_ids.push(player_id);
        }
    }

    let id = tournament.id;
    for player_id in &tournament.player_ids {
        add_member(db, id, *player_id);
    }
    log::info!(
        "Created tournament '{}' ({}) with {} players",
        tournament.name,
        id,
        tournament.current_player_count()
    );
    db.insert_tournament(tournament.clone());
    Ok(tournament)
}

/// Update metadata. A new roster is diffed against the current one.
pub fn update_tournament(
    db: &mut Database,
    tournament_id: TournamentId,
    update: TournamentUpdate,
) -> TournamentResult<Tournament> {
    let current_ids = tournament(db, tournament_id)?.player_ids;
    let name = match update.name.as_deref().map(str::trim) {
        Some("") => return Err(TournamentError::validation("tournament name must not be empty")),
        other => other.map(str::to_string),
    };

    if let Some(new_ids) = &update.player_ids {
        for player_id in new_ids {
            if db.player(*player_id).is_none() {
                return Err(TournamentError::player_not_found(*player_id));
            }
        }
        for player_id in current_ids.iter().filter(|id| !new_ids.contains(id)) {
            remove_member(db, tournament_id, *player_id);
        }
        for player_id in new_ids.iter().filter(|id| !current_ids.contains(id)) {
            add_member(db, tournament_id, *player_id);
        }
    }

    let t = db
        .tournament_mut(tournament_id)
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))?;
    if let Some(name) = name {
        t.name = name;
    }
    if update.description.is_some() {
        t.description = update.description.filter(|d| !d.trim().is_empty());
    }
    if update.start_date.is_some() {
        t.start_date = update.start_date;
    }
    if update.end_date.is_some() {
        t.end_date = update.end_date;
    }
    if let Some(days) = update.days {
        t.days = days;
    }
    if let Some(per_day) = update.matches_per_day {
        t.matches_per_day = per_day;
    }
    if let Some(max) = update.max_players {
        t.max_players = max;
    }
    if let Some(round) = update.current_round {
        t.current_round = round;
    }
    if let Some(status) = update.status {
        t.status = status;
    }
    if let Some(new_ids) = update.player_ids {
        let mut deduped: Vec<PlayerId> = Vec::with_capacity(new_ids.len());
        for id in new_ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        t.player_ids = deduped;
    }
    t.touch();
    Ok(t.clone())
}

/// Delete a tournament with its matches, stats rows and memberships.
/// Clears the current-tournament pointer if it pointed here.
pub fn delete_tournament(db: &mut Database, tournament_id: TournamentId) -> bool {
    let Some(tournament) = db.remove_tournament(tournament_id) else {
        return false;
    };
    let affected: Vec<PlayerId> = db
        .stats_for_tournament(tournament_id)
        .iter()
        .map(|s| s.player_id)
        .collect();
    let matches = db.remove_matches_where(|m| m.tournament_id == tournament_id);
    let stats = db.remove_stats_where(|s| s.tournament_id == tournament_id);
    db.remove_memberships_where(|m| m.tournament_id == tournament_id);
    for player_id in affected {
        update_player_totals(db, player_id);
    }

    if db.settings().and_then(|s| s.current_tournament_id) == Some(tournament_id) {
        clear_current_tournament(db);
    }
    log::info!(
        "Deleted tournament '{}' ({} matches, {} stats rows)",
        tournament.name,
        matches,
        stats
    );
    true
}

/// Join a player to a tournament.
///
/// Returns false when the tournament is full or the player already joined.
pub fn add_player_to_tournament(
    db: &mut Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> TournamentResult<bool> {
    if db.player(player_id).is_none() {
        return Err(TournamentError::player_not_found(player_id));
    }
    let t = db
        .tournament_mut(tournament_id)
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))?;
    if t.is_full() || t.has_player(player_id) {
        return Ok(false);
    }
    t.player_ids.push(player_id);
    t.touch();
    add_member(db, tournament_id, player_id);
    log::debug!("Player {} joined tournament {}", player_id, tournament_id);
    Ok(true)
}

/// Remove a player from a tournament roster, with their stats rows there.
/// Returns false if the tournament does not exist.
pub fn remove_player_from_tournament(
    db: &mut Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> bool {
    let Some(t) = db.tournament_mut(tournament_id) else {
        return false;
    };
    t.player_ids.retain(|id| *id != player_id);
    t.touch();
    remove_member(db, tournament_id, player_id);
    true
}

/// Add the join row and a zeroed stats row, so the member shows in standings
/// before their first finished match.
fn add_member(db: &mut Database, tournament_id: TournamentId, player_id: PlayerId) {
    db.add_membership(tournament_id, player_id);
    if db.stats_row(player_id, tournament_id).is_none() {
        db.upsert_stats(PlayerStats::new(player_id, tournament_id));
    }
}

/// Drop the join row and the stats row of one member.
fn remove_member(db: &mut Database, tournament_id: TournamentId, player_id: PlayerId) {
    db.remove_membership(tournament_id, player_id);
    if db.remove_stats_where(|s| s.tournament_id == tournament_id && s.player_id == player_id) > 0 {
        update_player_totals(db, player_id);
    }
    log::debug!("Player {} left tournament {}", player_id, tournament_id);
}

/// Members of a tournament ordered by name, then surname.
pub fn tournament_players(db: &Database, tournament_id: TournamentId) -> TournamentResult<Vec<Player>> {
    if db.tournament(tournament_id).is_none() {
        return Err(TournamentError::tournament_not_found(tournament_id));
    }
    let mut players: Vec<Player> = db
        .members_of(tournament_id)
        .into_iter()
        .filter_map(|id| db.player(id).cloned())
        .collect();
    players.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.surname.cmp(&b.surname)));
    Ok(players)
}

/// Matches ordered by round, then creation time.
pub fn tournament_matches(db: &Database, tournament_id: TournamentId) -> TournamentResult<Vec<GameMatch>> {
    if db.tournament(tournament_id).is_none() {
        return Err(TournamentError::tournament_not_found(tournament_id));
    }
    Ok(db
        .matches_for_tournament(tournament_id)
        .into_iter()
        .cloned()
        .collect())
}
