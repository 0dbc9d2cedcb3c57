//! Match result recorder and manual match management.

use crate::models::{
    GameMatch, MatchFormat, MatchId, MatchStatus, SetScore, Team, TeamId, TournamentError,
    TournamentId, TournamentResult,
};
use crate::store::Database;
use chrono::Utc;

pub fn match_by_id(db: &Database, match_id: MatchId) -> TournamentResult<GameMatch> {
    db.game(match_id)
        .cloned()
        .ok_or_else(|| TournamentError::match_not_found(match_id))
}

/// Store set scores and the winner.
///
/// With a winner the match becomes Completed, without one InProgress. Score
/// legality for the format is not checked here. A winner id must be one of
/// the two teams.
pub fn save_results(
    db: &mut Database,
    match_id: MatchId,
    scores: Vec<SetScore>,
    winner_team_id: Option<TeamId>,
) -> TournamentResult<GameMatch> {
    let game = db
        .game_mut(match_id)
        .ok_or_else(|| TournamentError::match_not_found(match_id))?;
    if let Some(winner) = winner_team_id {
        if game.side_of_team(winner).is_none() {
            return Err(TournamentError::validation(format!(
                "team {} does not play in match {}",
                winner, match_id
            )));
        }
    }

    game.scores = scores;
    game.winner_team_id = winner_team_id;
    game.status = if winner_team_id.is_some() {
        MatchStatus::Completed
    } else {
        MatchStatus::InProgress
    };
    game.updated_at = Utc::now();
    log::info!(
        "Saved results for match {} ({}): {:?}",
        match_id,
        game.score_display(),
        game.status
    );
    Ok(game.clone())
}

/// Record a draw: UnlimitedSet only, draws enabled, one equal numeric set score.
pub fn save_draw(db: &mut Database, match_id: MatchId, scores: Vec<SetScore>) -> TournamentResult<GameMatch> {
    let allow_draws = db.settings_or_default().allow_draws_in_unlimited_set;
    let game = db
        .game_mut(match_id)
        .ok_or_else(|| TournamentError::match_not_found(match_id))?;

    if game.format != MatchFormat::UnlimitedSet {
        return Err(TournamentError::validation(format!(
            "draws are only possible in unlimited-set matches, match {} is {:?}",
            match_id, game.format
        )));
    }
    if !allow_draws {
        return Err(TournamentError::validation("draws in unlimited-set matches are disabled"));
    }
    match scores.first().and_then(SetScore::numeric_pair) {
        Some((a, b)) if a == b && scores.len() == 1 => {}
        _ => {
            return Err(TournamentError::validation(
                "a draw needs exactly one set with equal numeric scores",
            ));
        }
    }

    game.scores = scores;
    game.winner_team_id = None;
    game.status = MatchStatus::Draw;
    game.updated_at = Utc::now();
    log::info!("Saved draw for match {} ({})", match_id, game.score_display());
    Ok(game.clone())
}

/// Add a hand-made match to the tournament's current round.
///
/// Both teams must be two distinct roster members and share no player.
pub fn create_manual_match(
    db: &mut Database,
    tournament_id: TournamentId,
    team_1: Team,
    team_2: Team,
    format: MatchFormat,
    court: Option<String>,
) -> TournamentResult<GameMatch> {
    let round = db
        .tournament(tournament_id)
        .map(|t| t.current_round)
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))?;

    for team in [&team_1, &team_2] {
        if team.player_1 == team.player_2 {
            return Err(TournamentError::validation("a team needs two different players"));
        }
        for player_id in team.players() {
            if db.player(player_id).is_none() {
                return Err(TournamentError::player_not_found(player_id));
            }
            if !db.is_member(tournament_id, player_id) {
                return Err(TournamentError::validation(format!(
                    "player {} is not in tournament {}",
                    player_id, tournament_id
                )));
            }
        }
    }
    if team_1.players().iter().any(|id| team_2.contains(*id)) {
        return Err(TournamentError::validation("a player cannot be on both teams"));
    }
    if team_1.id == team_2.id {
        return Err(TournamentError::validation("teams must have different ids"));
    }

    let mut game = GameMatch::new(tournament_id, round, team_1, team_2, format);
    game.court = court.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    log::info!("Created manual match {} in tournament {} round {}", game.id, tournament_id, round);
    db.insert_match(game.clone());
    Ok(game)
}

/// Delete one match. Returns false if it did not exist.
pub fn delete_match(db: &mut Database, match_id: MatchId) -> bool {
    match db.remove_match(match_id) {
        Some(game) => {
            log::info!("Deleted match {} of tournament {}", match_id, game.tournament_id);
            true
        }
        None => false,
    }
}

/// Delete every Pending or InProgress match of a tournament. Returns how many went.
pub fn delete_uncompleted_matches(db: &mut Database, tournament_id: TournamentId) -> usize {
    let removed =
        db.remove_matches_where(|m| m.tournament_id == tournament_id && !m.status.is_terminal());
    if removed > 0 {
        log::info!("Deleted {} uncompleted matches of tournament {}", removed, tournament_id);
    }
    removed
}
