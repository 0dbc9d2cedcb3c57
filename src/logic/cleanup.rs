//! Administrative bulk actions.

use crate::logic::players::delete_player;
use crate::logic::settings::clear_current_tournament;
use crate::logic::tournaments::delete_tournament;
use crate::models::{Player, PlayerId, StatCounters, Tournament, TournamentId};
use crate::store::Database;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DataCounts {
    pub players: usize,
    pub tournaments: usize,
    pub matches: usize,
    pub stats_rows: usize,
    pub memberships: usize,
    pub test_players: usize,
    pub test_tournaments: usize,
    /// Matches belonging to test tournaments.
    pub test_matches: usize,
}

/// What a test-data cleanup removed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub players: usize,
    pub tournaments: usize,
    pub matches: usize,
    pub stats_rows: usize,
}

fn is_test_tournament(t: &Tournament) -> bool {
    t.name.contains("Test")
}

fn is_test_player(p: &Player) -> bool {
    p.name.starts_with("Test")
}

pub fn data_counts(db: &Database) -> DataCounts {
    let test_tournaments: Vec<TournamentId> = db
        .tournaments()
        .filter(|t| is_test_tournament(t))
        .map(|t| t.id)
        .collect();
    DataCounts {
        players: db.players().count(),
        tournaments: db.tournaments().count(),
        matches: db.match_count(),
        stats_rows: db.all_stats().len(),
        memberships: db.membership_count(),
        test_players: db.players().filter(|p| is_test_player(p)).count(),
        test_tournaments: test_tournaments.len(),
        test_matches: test_tournaments
            .iter()
            .map(|id| db.matches_for_tournament(*id).len())
            .sum(),
    }
}

/// Remove tournaments named with "Test" and players whose name starts with
/// "Test", each with the usual cascades. Everything else is untouched.
pub fn cleanup_test_data(db: &mut Database) -> CleanupSummary {
    let before = data_counts(db);
    let tournaments: Vec<TournamentId> = db
        .tournaments()
        .filter(|t| is_test_tournament(t))
        .map(|t| t.id)
        .collect();
    for id in tournaments {
        delete_tournament(db, id);
    }
    let players: Vec<PlayerId> = db
        .players()
        .filter(|p| is_test_player(p))
        .map(|p| p.id)
        .collect();
    for id in players {
        delete_player(db, id);
    }

    let after = data_counts(db);
    let summary = CleanupSummary {
        players: before.players - after.players,
        tournaments: before.tournaments - after.tournaments,
        matches: before.matches - after.matches,
        stats_rows: before.stats_rows - after.stats_rows,
    };
    log::info!(
        "Removed test data: {} tournaments, {} players, {} matches",
        summary.tournaments,
        summary.players,
        summary.matches
    );
    summary
}

/// Remove all tournaments with their matches, stats and memberships, and zero
/// every player's totals. Players themselves are kept.
pub fn clear_all_data(db: &mut Database) -> DataCounts {
    let before = data_counts(db);
    db.remove_matches_where(|_| true);
    db.remove_stats_where(|_| true);
    db.remove_memberships_where(|_| true);
    let ids: Vec<_> = db.tournaments().map(|t| t.id).collect();
    for id in ids {
        db.remove_tournament(id);
    }
    let now = Utc::now();
    for player in db.players_mut() {
        player.totals = StatCounters::default();
        player.updated_at = now;
    }
    clear_current_tournament(db);
    log::warn!(
        "Cleared all tournament data ({} tournaments, {} matches, {} stats rows)",
        before.tournaments,
        before.matches,
        before.stats_rows
    );
    before
}
