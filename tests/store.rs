//! Integration tests for the Store: units of work, snapshots and concurrent recomputation.

use padel_tournament_web::logic;
use padel_tournament_web::{
    MatchFormat, NewPlayer, NewTournament, PlayerId, SetScore, SkillLevel, Store, Team,
    TournamentError, TournamentId,
};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

fn seed(store: &Store, players: usize) -> (TournamentId, Vec<PlayerId>) {
    store
        .transaction(|db| {
            let mut ids = Vec::new();
            for i in 0..players {
                let p = logic::add_player(
                    db,
                    NewPlayer {
                        name: format!("Player{i}"),
                        surname: "Store".to_string(),
                        skill_level: SkillLevel::Unassigned,
                        ..Default::default()
                    },
                )?;
                ids.push(p.id);
            }
            let t = logic::create_tournament(
                db,
                NewTournament {
                    name: "Store Open".to_string(),
                    player_ids: ids.clone(),
                    ..Default::default()
                },
            )?;
            Ok((t.id, ids))
        })
        .unwrap()
}

#[test]
fn failed_unit_of_work_commits_nothing() {
    let store = Store::default();
    let result: Result<(), TournamentError> = store.transaction(|db| {
        logic::add_player(
            db,
            NewPlayer {
                name: "Half".to_string(),
                surname: "Done".to_string(),
                ..Default::default()
            },
        )?;
        Err(TournamentError::validation("abort"))
    });
    assert!(result.is_err());
    assert_eq!(store.read(|db| db.players().count()), 0);
}

#[test]
fn recompute_missing_tournament() {
    let store = Store::default();
    let err = store.recompute_stats(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, TournamentError::NotFound(..)));
}

#[test]
fn snapshot_survives_reopen() {
    let path = std::env::temp_dir().join(format!("padel-store-{}.json", Uuid::new_v4()));
    let tid = {
        let store = Store::open(&path).unwrap();
        let (tid, _) = seed(&store, 4);
        store
            .transaction(|db| logic::set_current_tournament(db, tid))
            .unwrap();
        tid
    };
    assert!(path.exists());

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.read(|db| db.players().count()), 4);
    assert_eq!(reopened.read(|db| db.members_of(tid).len()), 4);
    assert_eq!(
        reopened.read(logic::current_tournament).map(|t| t.id),
        Some(tid)
    );
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn concurrent_recomputes_agree() {
    let store = Arc::new(Store::default());
    let (tid, ids) = seed(&store, 8);

    for chunk in ids.chunks_exact(4) {
        let m = store
            .transaction(|db| {
                logic::create_manual_match(
                    db,
                    tid,
                    Team::new(chunk[0], chunk[1]),
                    Team::new(chunk[2], chunk[3]),
                    MatchFormat::BestOfThree,
                    None,
                )
            })
            .unwrap();
        let winner = m.team_1.id;
        store
            .transaction(|db| {
                logic::save_results(
                    db,
                    m.id,
                    vec![SetScore::new(1, 6, 3), SetScore::new(2, 6, 4)],
                    Some(winner),
                )
            })
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.recompute_stats(tid).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let rows = store.read(|db| db.stats_for_tournament(tid).len());
    assert_eq!(rows, 8);
    for (i, id) in ids.iter().enumerate() {
        let player = store.read(|db| logic::player(db, *id)).unwrap();
        assert_eq!(player.totals.matches_played, 1);
        let expected_wins = if i % 4 < 2 { 1 } else { 0 };
        assert_eq!(player.totals.matches_won, expected_wins);
    }
}
