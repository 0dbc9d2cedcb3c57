//! Pairing generator: splits the roster into teams and teams into a round of matches.

use crate::models::{
    GameMatch, MatchFormat, PairingStrategy, Player, PlayerId, SkillLevel, Team, TournamentError,
    TournamentId, TournamentResult, MIN_PLAYERS_TO_START,
};
use crate::store::Database;
use rand::seq::SliceRandom;
use rand::Rng;

/// Roster split by skill tier, each bucket already shuffled.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TierBuckets {
    pub tier_a: Vec<PlayerId>,
    pub tier_b: Vec<PlayerId>,
    pub unassigned: Vec<PlayerId>,
}

impl TierBuckets {
    /// Bucket players by tier and shuffle each bucket independently.
    pub fn shuffled<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Self {
        let mut buckets = TierBuckets::default();
        for p in players {
            match p.skill_level {
                SkillLevel::TierA => buckets.tier_a.push(p.id),
                SkillLevel::TierB => buckets.tier_b.push(p.id),
                SkillLevel::Unassigned => buckets.unassigned.push(p.id),
            }
        }
        buckets.tier_a.shuffle(rng);
        buckets.tier_b.shuffle(rng);
        buckets.unassigned.shuffle(rng);
        buckets
    }
}

/// Form teams according to the strategy. Players that cannot be paired are left out.
///
/// - BalancedAB: one tier-A with one tier-B until either bucket runs out.
/// - SkillA / SkillB: consecutive pairs from that bucket only.
/// - Mixed: all buckets concatenated, reshuffled, then consecutive pairs.
pub fn form_teams<R: Rng + ?Sized>(strategy: PairingStrategy, buckets: TierBuckets, rng: &mut R) -> Vec<Team> {
    match strategy {
        PairingStrategy::BalancedAB => buckets
            .tier_a
            .iter()
            .zip(buckets.tier_b.iter())
            .map(|(a, b)| Team::new(*a, *b))
            .collect(),
        PairingStrategy::SkillA => pairs(&buckets.tier_a),
        PairingStrategy::SkillB => pairs(&buckets.tier_b),
        PairingStrategy::Mixed => {
            let mut all: Vec<PlayerId> = buckets
                .tier_a
                .into_iter()
                .chain(buckets.tier_b)
                .chain(buckets.unassigned)
                .collect();
            all.shuffle(rng);
            pairs(&all)
        }
    }
}

/// Consecutive pairs; an odd last player is left out.
fn pairs(ids: &[PlayerId]) -> Vec<Team> {
    ids.chunks_exact(2).map(|pair| Team::new(pair[0], pair[1])).collect()
}

/// Generate the next round of matches for a tournament using the thread RNG.
pub fn generate_matches(
    db: &mut Database,
    tournament_id: TournamentId,
    strategy: PairingStrategy,
    format: MatchFormat,
) -> TournamentResult<Vec<GameMatch>> {
    generate_matches_with_rng(db, tournament_id, strategy, format, &mut rand::thread_rng())
}

/// Generate the next round of matches.
///
/// 1. Refuse while any match of the tournament is Pending or InProgress.
/// 2. Require at least 4 roster members.
/// 3. Bucket and shuffle by tier, form teams by strategy.
/// 4. Pair teams in order (0 vs 1, 2 vs 3, ...); a trailing odd team sits out.
/// 5. Store the matches as Pending in the current round and advance the round.
pub fn generate_matches_with_rng<R: Rng + ?Sized>(
    db: &mut Database,
    tournament_id: TournamentId,
    strategy: PairingStrategy,
    format: MatchFormat,
    rng: &mut R,
) -> TournamentResult<Vec<GameMatch>> {
    let round = db
        .tournament(tournament_id)
        .map(|t| t.current_round)
        .ok_or_else(|| TournamentError::tournament_not_found(tournament_id))?;

    let uncompleted = db
        .matches_for_tournament(tournament_id)
        .iter()
        .filter(|m| !m.status.is_terminal())
        .count();
    if uncompleted > 0 {
        return Err(TournamentError::Conflict { uncompleted });
    }

    let roster: Vec<Player> = db
        .members_of(tournament_id)
        .into_iter()
        .filter_map(|id| db.player(id).cloned())
        .collect();
    if roster.len() < MIN_PLAYERS_TO_START {
        return Err(TournamentError::InsufficientPlayers {
            needed: MIN_PLAYERS_TO_START,
            current: roster.len(),
        });
    }

    let buckets = TierBuckets::shuffled(&roster, rng);
    let teams = form_teams(strategy, buckets, rng);
    if teams.len() < 2 {
        return Err(TournamentError::InsufficientTeams { formed: teams.len() });
    }

    let matches: Vec<GameMatch> = teams
        .chunks_exact(2)
        .map(|pair| GameMatch::new(tournament_id, round, pair[0].clone(), pair[1].clone(), format))
        .collect();

    for m in &matches {
        db.insert_match(m.clone());
    }
    if let Some(t) = db.tournament_mut(tournament_id) {
        t.current_round += 1;
        t.touch();
    }

    log::info!(
        "Generated {} matches for tournament {} round {} ({:?}, {:?}; {} teams, {} players seated)",
        matches.len(),
        tournament_id,
        round,
        strategy,
        format,
        teams.len(),
        matches.len() * 4
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<PlayerId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn balanced_stops_at_shorter_bucket() {
        let buckets = TierBuckets {
            tier_a: ids(3),
            tier_b: ids(5),
            unassigned: ids(2),
        };
        let teams = form_teams(PairingStrategy::BalancedAB, buckets.clone(), &mut StdRng::seed_from_u64(1));
        assert_eq!(teams.len(), 3);
        for (team, (a, b)) in teams.iter().zip(buckets.tier_a.iter().zip(buckets.tier_b.iter())) {
            assert_eq!(team.players(), [*a, *b]);
        }
    }

    #[test]
    fn single_tier_drops_odd_player() {
        let buckets = TierBuckets {
            tier_a: ids(1),
            tier_b: ids(5),
            unassigned: Vec::new(),
        };
        let teams = form_teams(PairingStrategy::SkillB, buckets, &mut StdRng::seed_from_u64(2));
        assert_eq!(teams.len(), 2);
    }

    #[test]
    fn mixed_uses_every_bucket() {
        let buckets = TierBuckets {
            tier_a: ids(2),
            tier_b: ids(2),
            unassigned: ids(3),
        };
        let everyone: Vec<PlayerId> = buckets
            .tier_a
            .iter()
            .chain(&buckets.tier_b)
            .chain(&buckets.unassigned)
            .copied()
            .collect();
        let teams = form_teams(PairingStrategy::Mixed, buckets, &mut StdRng::seed_from_u64(3));
        assert_eq!(teams.len(), 3);
        let seated: Vec<PlayerId> = teams.iter().flat_map(|t| t.players()).collect();
        assert!(seated.iter().all(|id| everyone.contains(id)));
        let mut unique = seated.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), seated.len());
    }
}
