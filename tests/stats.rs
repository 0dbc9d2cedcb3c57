//! Integration tests for results and the statistics engine, driven through the Store.

use padel_tournament_web::logic;
use padel_tournament_web::{
    GameMatch, MatchFormat, MatchStatus, NewPlayer, NewTournament, PlayerId, Score, SetScore,
    SettingsUpdate, SkillLevel, StatCounters, StatsSortBy, Store, Team, TournamentError,
    TournamentId, TournamentResult, TournamentUpdate,
};

/// A store with four players (two per tier) in one tournament.
fn fixture() -> (Store, TournamentId, Vec<PlayerId>) {
    let store = Store::default();
    let (tid, ids) = store
        .transaction(|db| {
            let ids = ["Ana", "Bea", "Carla", "Dani"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    logic::add_player(
                        db,
                        NewPlayer {
                            name: name.to_string(),
                            surname: "Ruiz".to_string(),
                            skill_level: if i < 2 { SkillLevel::TierA } else { SkillLevel::TierB },
                            ..Default::default()
                        },
                    )
                    .map(|p| p.id)
                })
                .collect::<TournamentResult<Vec<_>>>()?;
            let t = logic::create_tournament(
                db,
                NewTournament {
                    name: "Winter Cup".to_string(),
                    player_ids: ids.clone(),
                    ..Default::default()
                },
            )?;
            Ok((t.id, ids))
        })
        .unwrap();
    (store, tid, ids)
}

/// Ana & Bea vs Carla & Dani.
fn play(store: &Store, tid: TournamentId, ids: &[PlayerId], format: MatchFormat) -> GameMatch {
    store
        .transaction(|db| {
            logic::create_manual_match(
                db,
                tid,
                Team::new(ids[0], ids[1]),
                Team::new(ids[2], ids[3]),
                format,
                Some("Court 1".to_string()),
            )
        })
        .unwrap()
}

fn counters(store: &Store, player_id: PlayerId, tid: TournamentId) -> StatCounters {
    store
        .read(|db| logic::player_tournament_stats(db, player_id, tid))
        .expect("stats row")
        .counters
}

fn sets(pairs: &[(u32, u32)]) -> Vec<SetScore> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (a, b))| SetScore::new(i as u32 + 1, *a, *b))
        .collect()
}

#[test]
fn three_set_win_and_tie_break_loss() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 4), (3, 6), (6, 2)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    for id in &ids[..2] {
        let c = counters(&store, *id, tid);
        assert_eq!(c.matches_played, 1);
        assert_eq!(c.matches_won, 1);
        assert_eq!(c.points, 3);
        assert_eq!((c.sets_won, c.sets_lost), (2, 1));
        assert_eq!((c.games_won, c.games_lost), (15, 12));
    }
    for id in &ids[2..] {
        let c = counters(&store, *id, tid);
        assert_eq!(c.matches_lost, 1);
        assert_eq!(c.points, 1);
        assert_eq!((c.sets_won, c.sets_lost), (1, 2));
    }
}

#[test]
fn straight_sets_loss_scores_plain_loss_points() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_2.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(2, 6), (4, 6)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    let loser = counters(&store, ids[0], tid);
    assert_eq!(loser.points, 0);
    assert_eq!((loser.sets_won, loser.sets_lost), (0, 2));
    let winner = counters(&store, ids[3], tid);
    assert_eq!(winner.points, 3);
    assert_eq!(winner.matches_won, 1);
}

#[test]
fn unlimited_set_draw() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::UnlimitedSet);
    let saved = store
        .transaction(|db| logic::save_draw(db, m.id, sets(&[(5, 5)])))
        .unwrap();
    assert_eq!(saved.status, MatchStatus::Draw);
    assert_eq!(saved.winner_team_id, None);
    store.recompute_stats(tid).unwrap();

    for id in &ids {
        let c = counters(&store, *id, tid);
        assert_eq!(c.matches_played, 1);
        assert_eq!(c.matches_drawn, 1);
        assert_eq!(c.points, 1);
        assert_eq!((c.sets_won, c.sets_lost), (0, 0));
        assert_eq!((c.games_won, c.games_lost), (5, 5));
    }
}

#[test]
fn golden_point_win_counts_one_set() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::GoldenPoint);
    let scores = vec![SetScore {
        set_number: 1,
        team_1: Score::GoldenPoint,
        team_2: Score::Numeric(0),
    }];
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, scores, Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    let c = counters(&store, ids[0], tid);
    assert_eq!((c.sets_won, c.sets_lost), (1, 0));
    assert_eq!(c.points, 3);
    let c = counters(&store, ids[2], tid);
    assert_eq!((c.sets_won, c.sets_lost), (0, 1));
    assert_eq!(c.points, 0);
}

#[test]
fn draw_rejected_outside_unlimited_set() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let err = store
        .transaction(|db| logic::save_draw(db, m.id, sets(&[(5, 5)])))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));

    let m = play(&store, tid, &ids, MatchFormat::UnlimitedSet);
    let err = store
        .transaction(|db| logic::save_draw(db, m.id, sets(&[(6, 5)])))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
}

#[test]
fn draw_rejected_when_disabled() {
    let (store, tid, ids) = fixture();
    store
        .transaction(|db| {
            let update = SettingsUpdate {
                allow_draws_in_unlimited_set: Some(false),
                ..Default::default()
            };
            Ok(logic::apply_settings_update(db, &update))
        })
        .unwrap();
    let m = play(&store, tid, &ids, MatchFormat::UnlimitedSet);
    let err = store
        .transaction(|db| logic::save_draw(db, m.id, sets(&[(4, 4)])))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    let status = store.read(|db| db.game(m.id).map(|g| g.status));
    assert_eq!(status, Some(MatchStatus::Pending));
}

#[test]
fn foreign_winner_is_rejected_and_nothing_changes() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let stranger = Team::new(ids[0], ids[2]);
    let err = store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 0), (6, 0)]), Some(stranger.id)))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    let stored = store.read(|db| logic::match_by_id(db, m.id)).unwrap();
    assert!(stored.scores.is_empty());
    assert_eq!(stored.status, MatchStatus::Pending);
}

#[test]
fn scores_without_winner_leave_match_in_progress() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let saved = store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 3)]), None))
        .unwrap();
    assert_eq!(saved.status, MatchStatus::InProgress);
    store.recompute_stats(tid).unwrap();
    assert_eq!(counters(&store, ids[0], tid), StatCounters::default());
}

#[test]
fn recompute_is_idempotent() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 4), (6, 4)]), Some(winner)))
        .unwrap();

    store.recompute_stats(tid).unwrap();
    let first: Vec<_> = store.read(|db| db.stats_for_tournament(tid).into_iter().cloned().collect());
    store.recompute_stats(tid).unwrap();
    let second: Vec<_> = store.read(|db| db.stats_for_tournament(tid).into_iter().cloned().collect());

    assert_eq!(first.len(), 4);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.counters, b.counters);
    }
}

#[test]
fn win_rate_stays_within_bounds() {
    let (store, tid, ids) = fixture();
    for round in 0..5 {
        let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
        let winner = if round % 2 == 0 { m.team_1.id } else { m.team_2.id };
        store
            .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 1), (6, 1)]), Some(winner)))
            .unwrap();
    }
    store.recompute_stats(tid).unwrap();

    for id in &ids {
        let row = store
            .read(|db| logic::player_tournament_stats(db, *id, tid))
            .unwrap();
        let rate = row.win_rate();
        assert!((0.0..=100.0).contains(&rate));
        assert_eq!(row.counters.matches_played, 5);
        assert_eq!(
            row.counters.matches_won + row.counters.matches_lost + row.counters.matches_drawn,
            row.counters.matches_played
        );
    }
    assert_eq!(counters(&store, ids[0], tid).matches_won, 3);
}

#[test]
fn totals_sum_across_tournaments() {
    let (store, tid, ids) = fixture();
    let second = store
        .transaction(|db| {
            logic::create_tournament(
                db,
                NewTournament {
                    name: "Spring Cup".to_string(),
                    player_ids: ids.clone(),
                    ..Default::default()
                },
            )
        })
        .unwrap()
        .id;

    for t in [tid, second] {
        let m = play(&store, t, &ids, MatchFormat::BestOfThree);
        let winner = m.team_1.id;
        store
            .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 2), (6, 2)]), Some(winner)))
            .unwrap();
    }
    assert_eq!(store.recompute_all_stats().unwrap(), 2);

    let ana = store.read(|db| logic::player(db, ids[0])).unwrap();
    assert_eq!(ana.totals.matches_played, 2);
    assert_eq!(ana.totals.matches_won, 2);
    assert_eq!(ana.totals.points, 6);
    assert_eq!(ana.totals.games_won, 24);

    let overall = store.read(|db| logic::overall_standings(db, StatsSortBy::Points));
    assert_eq!(overall.len(), 4);
    assert_eq!(overall[0].counters.points, 6);
    assert_eq!(overall[0].rank, 1);
}

#[test]
fn removed_players_are_not_credited() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 2), (6, 2)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    let remaining = ids[1..].to_vec();
    store
        .transaction(|db| {
            logic::update_tournament(
                db,
                tid,
                TournamentUpdate {
                    player_ids: Some(remaining),
                    ..Default::default()
                },
            )
        })
        .unwrap();
    store.recompute_stats(tid).unwrap();

    assert!(store
        .read(|db| logic::player_tournament_stats(db, ids[0], tid))
        .is_none());
    assert_eq!(counters(&store, ids[1], tid).matches_won, 1);
    let ana = store.read(|db| logic::player(db, ids[0])).unwrap();
    assert_eq!(ana.totals, StatCounters::default());
}

#[test]
fn deleting_a_match_removes_its_contribution() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 2), (6, 2)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();
    assert_eq!(counters(&store, ids[0], tid).points, 3);

    assert!(store.transaction(|db| Ok(logic::delete_match(db, m.id))).unwrap());
    store.recompute_stats(tid).unwrap();
    assert_eq!(counters(&store, ids[0], tid), StatCounters::default());
}

#[test]
fn tournament_standings_rank_winners_first() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_2.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(4, 6), (6, 4), (2, 6)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    let standings = store
        .read(|db| logic::tournament_standings(db, tid, StatsSortBy::Points))
        .unwrap();
    let ranked: Vec<PlayerId> = standings.iter().map(|s| s.player_id).collect();
    // Winners tie on every key and are ordered by name: Carla, Dani.
    assert_eq!(ranked, vec![ids[2], ids[3], ids[0], ids[1]]);
    assert_eq!(standings[0].win_rate, 100.0);
    assert_eq!(standings[3].rank, 4);

    let csv = logic::standings_to_csv(&standings).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("rank,player,points"));
    assert!(lines.next().unwrap().starts_with("1,Carla Ruiz,3,1,1,0,0,2,1"));
}

#[test]
fn manual_match_validates_teams() {
    let (store, tid, ids) = fixture();
    let err = store
        .transaction(|db| {
            logic::create_manual_match(
                db,
                tid,
                Team::new(ids[0], ids[1]),
                Team::new(ids[1], ids[2]),
                MatchFormat::BestOfThree,
                None,
            )
        })
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));

    let err = store
        .transaction(|db| {
            logic::create_manual_match(
                db,
                tid,
                Team::new(ids[0], ids[0]),
                Team::new(ids[2], ids[3]),
                MatchFormat::BestOfThree,
                None,
            )
        })
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    assert_eq!(store.read(|db| db.match_count()), 0);
}

#[test]
fn delete_uncompleted_keeps_finished_matches() {
    let (store, tid, ids) = fixture();
    let done = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = done.team_1.id;
    store
        .transaction(|db| logic::save_results(db, done.id, sets(&[(6, 0), (6, 0)]), Some(winner)))
        .unwrap();
    play(&store, tid, &ids, MatchFormat::BestOfThree);
    play(&store, tid, &ids, MatchFormat::UnlimitedSet);

    let removed = store
        .transaction(|db| Ok(logic::delete_uncompleted_matches(db, tid)))
        .unwrap();
    assert_eq!(removed, 2);
    let left = store.read(|db| logic::tournament_matches(db, tid)).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, done.id);
}

#[test]
fn huge_game_scores_do_not_break_recompute() {
    let (store, tid, ids) = fixture();
    let huge = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = huge.team_1.id;
    store
        .transaction(|db| logic::save_results(db, huge.id, sets(&[(u32::MAX, 0), (1, 0)]), Some(winner)))
        .unwrap();
    let normal = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = normal.team_1.id;
    store
        .transaction(|db| logic::save_results(db, normal.id, sets(&[(6, 0), (6, 0)]), Some(winner)))
        .unwrap();

    store.recompute_stats(tid).unwrap();

    let c = counters(&store, ids[0], tid);
    assert_eq!(c.matches_played, 2);
    assert_eq!(c.matches_won, 2);
    assert_eq!(c.points, 6);
    assert_eq!(c.games_won, u32::MAX);
    // The overflowing second set of the first match is not counted.
    assert_eq!(c.sets_won, 3);
    let standings = store
        .read(|db| logic::tournament_standings(db, tid, StatsSortBy::Points))
        .unwrap();
    assert_eq!(standings.len(), 4);
}

#[test]
fn late_joiner_is_listed_at_zero() {
    let (store, tid, ids) = fixture();
    let m = play(&store, tid, &ids, MatchFormat::BestOfThree);
    let winner = m.team_1.id;
    store
        .transaction(|db| logic::save_results(db, m.id, sets(&[(6, 3), (6, 3)]), Some(winner)))
        .unwrap();
    store.recompute_stats(tid).unwrap();

    let late = store
        .transaction(|db| {
            let p = logic::add_player(
                db,
                NewPlayer {
                    name: "Elena".to_string(),
                    surname: "Ruiz".to_string(),
                    ..Default::default()
                },
            )?;
            assert!(logic::add_player_to_tournament(db, tid, p.id)?);
            Ok(p.id)
        })
        .unwrap();

    let standings = store
        .read(|db| logic::tournament_standings(db, tid, StatsSortBy::Points))
        .unwrap();
    assert_eq!(standings.len(), 5);
    let elena = standings.iter().find(|s| s.player_id == late).unwrap();
    assert_eq!(elena.counters, StatCounters::default());
    assert_eq!(elena.rank, 5);

    store.recompute_stats(tid).unwrap();
    assert_eq!(counters(&store, late, tid), StatCounters::default());
    assert_eq!(counters(&store, ids[0], tid).points, 3);
}

#[test]
fn roster_update_adds_zero_rows() {
    let (store, tid, ids) = fixture();
    let newcomer = store
        .transaction(|db| {
            let p = logic::add_player(
                db,
                NewPlayer {
                    name: "Fede".to_string(),
                    surname: "Ruiz".to_string(),
                    ..Default::default()
                },
            )?;
            let mut roster = ids.clone();
            roster.push(p.id);
            logic::update_tournament(
                db,
                tid,
                TournamentUpdate {
                    player_ids: Some(roster),
                    ..Default::default()
                },
            )?;
            Ok(p.id)
        })
        .unwrap();
    assert_eq!(counters(&store, newcomer, tid), StatCounters::default());
}
