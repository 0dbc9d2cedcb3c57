//! Statistics engine: rebuilds per-tournament stats rows from finished matches.
//!
//! Recomputation is a full rebuild. Every roster member starts at zero, each
//! Completed or Draw match adds to the four players in it, and the rows are
//! then upserted and each player's lifetime totals re-summed from all rows.

use crate::models::{
    AppSettings, GameMatch, MatchFormat, MatchStatus, PlayerId, PlayerStats, Side, StatCounters,
    TournamentError, TournamentId, TournamentResult,
};
use crate::store::Database;
use chrono::Utc;
use std::collections::HashMap;

/// Everything one recomputation reads, taken from a single consistent view.
#[derive(Clone, Debug)]
pub struct StatsInput {
    pub tournament_id: TournamentId,
    pub settings: AppSettings,
    /// From the membership rows, not the tournament's id list.
    pub roster: Vec<PlayerId>,
    /// Only Completed and Draw matches.
    pub matches: Vec<GameMatch>,
}

/// Collect the inputs for one tournament.
pub fn stats_input(db: &Database, tournament_id: TournamentId) -> TournamentResult<StatsInput> {
    if db.tournament(tournament_id).is_none() {
        return Err(TournamentError::tournament_not_found(tournament_id));
    }
    let settings = db.settings().cloned().unwrap_or_default();
    let matches = db
        .matches_for_tournament(tournament_id)
        .into_iter()
        .filter(|m| m.status.is_terminal())
        .cloned()
        .collect();
    Ok(StatsInput {
        tournament_id,
        settings,
        roster: db.members_of(tournament_id),
        matches,
    })
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Outcome {
    Draw,
    Won(Side),
    /// Completed without a usable winner id; only played/sets/games count.
    Undecided,
}

fn outcome(game: &GameMatch) -> Outcome {
    match game.status {
        MatchStatus::Draw => Outcome::Draw,
        MatchStatus::Completed => game
            .winner_team_id
            .and_then(|id| game.side_of_team(id))
            .map_or(Outcome::Undecided, Outcome::Won),
        MatchStatus::Pending | MatchStatus::InProgress => Outcome::Undecided,
    }
}

/// Per-side tallies of one match: `.0` is team 1, `.1` team 2.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct MatchTally {
    sets: (u32, u32),
    games: (u32, u32),
}

impl MatchTally {
    fn for_side(&self, side: Side) -> (u32, u32, u32, u32) {
        match side {
            Side::One => (self.sets.0, self.sets.1, self.games.0, self.games.1),
            Side::Two => (self.sets.1, self.sets.0, self.games.1, self.games.0),
        }
    }
}

/// Sets (and games) each side won, by format. Non-numeric set scores are skipped.
fn tally(game: &GameMatch, outcome: Outcome) -> MatchTally {
    let mut t = MatchTally::default();
    match game.format {
        MatchFormat::BestOfThree => {
            for (a, b) in game.scores.iter().filter_map(|s| s.numeric_pair()) {
                // A set whose games no longer fit is treated as unparsable.
                let (Some(games_1), Some(games_2)) =
                    (t.games.0.checked_add(a), t.games.1.checked_add(b))
                else {
                    log::warn!("Skipping set {}-{} of match {}: game total overflows", a, b, game.id);
                    continue;
                };
                if a > b {
                    t.sets.0 += 1;
                } else if b > a {
                    t.sets.1 += 1;
                }
                t.games = (games_1, games_2);
            }
        }
        MatchFormat::UnlimitedSet => {
            if let Some((a, b)) = game.scores.first().and_then(|s| s.numeric_pair()) {
                if a > b {
                    t.sets = (1, 0);
                } else if b > a {
                    t.sets = (0, 1);
                }
                t.games = (a, b);
            }
        }
        MatchFormat::GoldenPoint => {
            // One symbolic set for the declared winner, none on a draw.
            match outcome {
                Outcome::Won(Side::One) => t.sets = (1, 0),
                Outcome::Won(Side::Two) => t.sets = (0, 1),
                Outcome::Draw | Outcome::Undecided => {}
            }
        }
    }
    t
}

/// Points a losing player earns: the tie-break rate for a 1-2 BestOfThree loss.
fn loss_points(settings: &AppSettings, format: MatchFormat, sets_won: u32, sets_lost: u32) -> i32 {
    if format == MatchFormat::BestOfThree && sets_won == 1 && sets_lost == 2 {
        settings.points_tie_break_loss
    } else {
        settings.points_loss
    }
}

/// Add one finished match to the counters of the roster players in it.
fn apply_match(counters: &mut HashMap<PlayerId, StatCounters>, settings: &AppSettings, game: &GameMatch) {
    let outcome = outcome(game);
    let tally = tally(game, outcome);

    for side in [Side::One, Side::Two] {
        let (sets_won, sets_lost, games_won, games_lost) = tally.for_side(side);
        for player_id in game.team(side).players() {
            // Players no longer on the roster are not credited.
            let Some(c) = counters.get_mut(&player_id) else {
                continue;
            };
            let mut delta = StatCounters {
                matches_played: 1,
                sets_won,
                sets_lost,
                games_won,
                games_lost,
                ..StatCounters::default()
            };
            match outcome {
                Outcome::Draw => {
                    delta.matches_drawn = 1;
                    delta.points = settings.points_draw;
                }
                Outcome::Won(winner) if winner == side => {
                    delta.matches_won = 1;
                    delta.points = settings.points_win;
                }
                Outcome::Won(_) => {
                    delta.matches_lost = 1;
                    delta.points = loss_points(settings, game.format, sets_won, sets_lost);
                }
                Outcome::Undecided => {}
            }
            *c += delta;
        }
    }
}

/// Pure computation of a tournament's stats rows, one per roster member.
///
/// Rows come back in roster order with fresh ids; `write_stats` keeps the ids
/// of rows that already exist.
pub fn compute_tournament_stats(input: &StatsInput) -> Vec<PlayerStats> {
    let mut counters: HashMap<PlayerId, StatCounters> = input
        .roster
        .iter()
        .map(|id| (*id, StatCounters::default()))
        .collect();

    for game in input.matches.iter().filter(|m| m.status.is_terminal()) {
        apply_match(&mut counters, &input.settings, game);
    }

    input
        .roster
        .iter()
        .map(|player_id| {
            let mut row = PlayerStats::new(*player_id, input.tournament_id);
            row.counters = counters.get(player_id).copied().unwrap_or_default();
            row
        })
        .collect()
}

/// Upsert computed rows and re-sum the affected players' lifetime totals.
///
/// Rows for a tournament deleted since the inputs were read are dropped.
pub fn write_stats(db: &mut Database, rows: Vec<PlayerStats>) {
    let mut touched = Vec::with_capacity(rows.len());
    for row in rows {
        if db.tournament(row.tournament_id).is_none() {
            log::warn!(
                "Dropping stats for player {}: tournament {} no longer exists",
                row.player_id,
                row.tournament_id
            );
            continue;
        }
        touched.push(row.player_id);
        db.upsert_stats(row);
    }
    for player_id in touched {
        update_player_totals(db, player_id);
    }
}

/// Rebuild one tournament's stats inside the caller's unit of work.
pub fn recompute_stats(db: &mut Database, tournament_id: TournamentId) -> TournamentResult<()> {
    let input = stats_input(db, tournament_id)?;
    let rows = compute_tournament_stats(&input);
    log::info!(
        "Recomputed stats for tournament {}: {} players, {} finished matches",
        tournament_id,
        rows.len(),
        input.matches.len()
    );
    write_stats(db, rows);
    Ok(())
}

/// Rebuild every tournament. Returns how many were processed.
pub fn recompute_all_stats(db: &mut Database) -> TournamentResult<usize> {
    let ids: Vec<TournamentId> = db.tournaments().map(|t| t.id).collect();
    for id in &ids {
        recompute_stats(db, *id)?;
    }
    Ok(ids.len())
}

/// Overwrite a player's totals with the sum of all their stats rows.
pub fn update_player_totals(db: &mut Database, player_id: PlayerId) {
    let totals: StatCounters = db
        .stats_for_player(player_id)
        .into_iter()
        .map(|s| &s.counters)
        .sum();
    if let Some(player) = db.player_mut(player_id) {
        player.totals = totals;
        player.updated_at = Utc::now();
    }
}

/// The stats row of one player in one tournament.
pub fn player_tournament_stats(
    db: &Database,
    player_id: PlayerId,
    tournament_id: TournamentId,
) -> Option<PlayerStats> {
    db.stats_row(player_id, tournament_id).cloned()
}
