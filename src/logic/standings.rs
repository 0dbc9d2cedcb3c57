//! Standings: ranking comparator, per-tournament and overall tables, CSV export.

use crate::models::{
    PlayerId, Standing, StatCounters, StatsSortBy, TournamentError, TournamentId, TournamentResult,
};
use crate::store::Database;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Descending on the primary key, then matches won, set ratio and sets won
/// (all descending), then full name ascending.
pub fn compare_for_ranking(a: &Standing, b: &Standing, sort_by: StatsSortBy) -> Ordering {
    let primary = match sort_by {
        StatsSortBy::Points => b.counters.points.cmp(&a.counters.points),
        StatsSortBy::MatchesWon => b.counters.matches_won.cmp(&a.counters.matches_won),
        StatsSortBy::WinRate => b.win_rate.total_cmp(&a.win_rate),
        StatsSortBy::SetsWon => b.counters.sets_won.cmp(&a.counters.sets_won),
    };
    primary
        .then_with(|| b.counters.matches_won.cmp(&a.counters.matches_won))
        .then_with(|| b.set_ratio.total_cmp(&a.set_ratio))
        .then_with(|| b.counters.sets_won.cmp(&a.counters.sets_won))
        .then_with(|| a.full_name.cmp(&b.full_name))
}

/// Sort and number standings in place.
pub fn rank(standings: &mut [Standing], sort_by: StatsSortBy) {
    standings.sort_by(|a, b| compare_for_ranking(a, b, sort_by));
    for (i, s) in standings.iter_mut().enumerate() {
        s.rank = i + 1;
    }
}

fn standing(db: &Database, player_id: PlayerId, counters: StatCounters) -> Standing {
    let (full_name, display_name) = db
        .player(player_id)
        .map(|p| (p.full_name(), p.display_name()))
        .unwrap_or_default();
    Standing::new(player_id, full_name, display_name, counters)
}

/// Ranked stats rows of one tournament.
pub fn tournament_standings(
    db: &Database,
    tournament_id: TournamentId,
    sort_by: StatsSortBy,
) -> TournamentResult<Vec<Standing>> {
    if db.tournament(tournament_id).is_none() {
        return Err(TournamentError::tournament_not_found(tournament_id));
    }
    let mut standings: Vec<Standing> = db
        .stats_for_tournament(tournament_id)
        .into_iter()
        .map(|row| standing(db, row.player_id, row.counters))
        .collect();
    rank(&mut standings, sort_by);
    Ok(standings)
}

/// Cross-tournament standings: every player's rows summed, metrics re-derived from the sums.
pub fn overall_standings(db: &Database, sort_by: StatsSortBy) -> Vec<Standing> {
    let mut totals: HashMap<PlayerId, StatCounters> = HashMap::new();
    for row in db.all_stats() {
        *totals.entry(row.player_id).or_default() += row.counters;
    }
    let mut standings: Vec<Standing> = totals
        .into_iter()
        .map(|(player_id, counters)| standing(db, player_id, counters))
        .collect();
    rank(&mut standings, sort_by);
    standings
}

fn format_ratio(ratio: f64) -> String {
    if ratio.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", ratio)
    }
}

/// Standings as CSV with a header row.
pub fn standings_to_csv(standings: &[Standing]) -> TournamentResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "rank",
        "player",
        "points",
        "matches_played",
        "matches_won",
        "matches_drawn",
        "matches_lost",
        "sets_won",
        "sets_lost",
        "games_won",
        "games_lost",
        "win_rate",
        "set_ratio",
    ])?;
    for s in standings {
        let c = &s.counters;
        writer.write_record([
            s.rank.to_string(),
            s.display_name.clone(),
            c.points.to_string(),
            c.matches_played.to_string(),
            c.matches_won.to_string(),
            c.matches_drawn.to_string(),
            c.matches_lost.to_string(),
            c.sets_won.to_string(),
            c.sets_lost.to_string(),
            c.games_won.to_string(),
            c.games_lost.to_string(),
            format!("{:.1}", s.win_rate),
            format_ratio(s.set_ratio),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TournamentError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::validation(format!("standings are not UTF-8: {}", e)))
}
