//! Settings provider: scoring configuration and the current-tournament pointer.

use crate::models::{AppSettings, SettingsUpdate, Tournament, TournamentError, TournamentId, TournamentResult};
use crate::store::Database;
use chrono::Utc;

/// Current settings, creating the defaults on first read.
pub fn get_settings(db: &mut Database) -> AppSettings {
    db.settings_or_default().clone()
}

/// Replace the whole settings row. A current-tournament id must exist.
pub fn update_settings(db: &mut Database, mut settings: AppSettings) -> TournamentResult<AppSettings> {
    if let Some(id) = settings.current_tournament_id {
        if db.tournament(id).is_none() {
            return Err(TournamentError::tournament_not_found(id));
        }
    }
    settings.updated_at = Utc::now();
    db.replace_settings(settings.clone());
    Ok(settings)
}

/// Change only the fields set in `update`.
pub fn apply_settings_update(db: &mut Database, update: &SettingsUpdate) -> AppSettings {
    let settings = db.settings_or_default();
    update.apply_to(settings);
    settings.updated_at = Utc::now();
    settings.clone()
}

pub fn set_current_tournament(db: &mut Database, tournament_id: TournamentId) -> TournamentResult<Tournament> {
    let tournament = db
        .tournament(tournament_id)
        .cloned()
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))?;
    let settings = db.settings_or_default();
    settings.current_tournament_id = Some(tournament_id);
    settings.updated_at = Utc::now();
    Ok(tournament)
}

pub fn clear_current_tournament(db: &mut Database) {
    let settings = db.settings_or_default();
    settings.current_tournament_id = None;
    settings.updated_at = Utc::now();
}

/// The tournament the settings point at, if any (and if it still exists).
pub fn current_tournament(db: &Database) -> Option<Tournament> {
    db.settings()
        .and_then(|s| s.current_tournament_id)
        .and_then(|id| db.tournament(id))
        .cloned()
}
