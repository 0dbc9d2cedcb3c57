//! Store: the lock-protected database every request runs against.
//!
//! Each mutating request is one unit of work: it runs on a copy of the
//! tables and only replaces them (and the snapshot file) when it succeeds.
//! Stats recomputation is additionally serialised per tournament.

mod database;

pub use database::Database;

use crate::logic::cleanup::{self, CleanupSummary, DataCounts};
use crate::logic::{stats, tournaments};
use crate::models::{TournamentId, TournamentResult};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

pub struct Store {
    db: RwLock<Database>,
    recompute_locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
    data_file: Option<PathBuf>,
}

impl Store {
    /// Purely in-memory store.
    pub fn new(db: Database) -> Self {
        Self {
            db: RwLock::new(db),
            recompute_locks: Mutex::new(HashMap::new()),
            data_file: None,
        }
    }

    /// Store backed by a JSON snapshot file. A missing file starts an empty database.
    pub fn open(path: impl Into<PathBuf>) -> TournamentResult<Self> {
        let path = path.into();
        let db = if path.exists() {
            let file = fs::File::open(&path)?;
            let db: Database = serde_json::from_reader(BufReader::new(file))?;
            log::info!("Loaded data snapshot from {}", path.display());
            db
        } else {
            log::info!("No snapshot at {}, starting empty", path.display());
            Database::new()
        };
        Ok(Self {
            data_file: Some(path),
            ..Self::new(db)
        })
    }

    /// Run a read-only query against a consistent view of the tables.
    pub fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        // Writers only swap in fully committed tables, so a poisoned lock still guards valid data.
        let guard = self.db.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run one unit of work. On error nothing is committed.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut Database) -> TournamentResult<R>,
    ) -> TournamentResult<R> {
        let mut guard = self.db.write().unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let out = f(&mut working)?;
        if let Some(path) = &self.data_file {
            write_snapshot(path, &working)?;
        }
        *guard = working;
        Ok(out)
    }

    /// Rebuild a tournament's stats rows and the totals of its players.
    ///
    /// Concurrent calls for the same tournament run one after the other;
    /// different tournaments do not block each other.
    pub fn recompute_stats(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        let lock = self.recompute_lock(tournament_id);
        let _serial = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let input = self.read(|db| stats::stats_input(db, tournament_id))?;
        let rows = stats::compute_tournament_stats(&input);
        self.transaction(|db| {
            stats::write_stats(db, rows);
            Ok(())
        })
    }

    /// Recompute every tournament in turn. Returns how many were processed.
    pub fn recompute_all_stats(&self) -> TournamentResult<usize> {
        let ids: Vec<TournamentId> = self.read(|db| db.tournaments().map(|t| t.id).collect());
        for id in &ids {
            self.recompute_stats(*id)?;
        }
        Ok(ids.len())
    }

    /// Delete a tournament with its dependent rows and forget its recompute lock.
    pub fn delete_tournament(&self, tournament_id: TournamentId) -> TournamentResult<bool> {
        let deleted = self.transaction(|db| Ok(tournaments::delete_tournament(db, tournament_id)))?;
        if deleted {
            self.prune_locks();
        }
        Ok(deleted)
    }

    /// Clear all tournament data and every recompute lock. Returns the counts from before.
    pub fn clear_all_data(&self) -> TournamentResult<DataCounts> {
        let before = self.transaction(|db| Ok(cleanup::clear_all_data(db)))?;
        self.prune_locks();
        Ok(before)
    }

    /// Remove test tournaments and test players, then their recompute locks.
    pub fn cleanup_test_data(&self) -> TournamentResult<CleanupSummary> {
        let summary = self.transaction(|db| Ok(cleanup::cleanup_test_data(db)))?;
        self.prune_locks();
        Ok(summary)
    }

    /// Write the current tables to the snapshot file, if one is configured.
    pub fn persist(&self) -> TournamentResult<()> {
        if let Some(path) = &self.data_file {
            self.read(|db| write_snapshot(path, db))?;
        }
        Ok(())
    }

    fn lock_table(&self) -> MutexGuard<'_, HashMap<TournamentId, Arc<Mutex<()>>>> {
        self.recompute_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget locks of tournaments that no longer exist.
    fn prune_locks(&self) {
        let live: HashSet<TournamentId> = self.read(|db| db.tournaments().map(|t| t.id).collect());
        self.lock_table().retain(|id, _| live.contains(id));
    }

    fn recompute_lock(&self, tournament_id: TournamentId) -> Arc<Mutex<()>> {
        self.lock_table().entry(tournament_id).or_default().clone()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Database::new())
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_snapshot(path: &Path, db: &Database) -> TournamentResult<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, db)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    log::debug!("Wrote data snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tournament;

    fn store_with_tournaments(n: usize) -> (Store, Vec<TournamentId>) {
        let mut db = Database::new();
        let ids = (0..n)
            .map(|i| {
                let t = Tournament::new(format!("Cup {i}"));
                let id = t.id;
                db.insert_tournament(t);
                id
            })
            .collect();
        (Store::new(db), ids)
    }

    #[test]
    fn deleting_a_tournament_drops_its_lock() {
        let (store, ids) = store_with_tournaments(2);
        for id in &ids {
            store.recompute_stats(*id).unwrap();
        }
        assert_eq!(store.lock_table().len(), 2);

        assert!(store.delete_tournament(ids[0]).unwrap());
        assert!(!store.lock_table().contains_key(&ids[0]));
        assert!(store.lock_table().contains_key(&ids[1]));
        assert!(!store.delete_tournament(ids[0]).unwrap());
    }

    #[test]
    fn clearing_all_data_drops_every_lock() {
        let (store, ids) = store_with_tournaments(3);
        assert_eq!(store.recompute_all_stats().unwrap(), 3);
        let before = store.clear_all_data().unwrap();
        assert_eq!(before.tournaments, 3);
        assert!(store.lock_table().is_empty());
        assert!(store.read(|db| db.tournament(ids[0]).is_none()));
    }

    #[test]
    fn test_data_cleanup_drops_only_removed_locks() {
        let mut db = Database::new();
        let kept = Tournament::new("Spring League");
        let test = Tournament::new("Test Cup");
        let (kept_id, test_id) = (kept.id, test.id);
        db.insert_tournament(kept);
        db.insert_tournament(test);
        let store = Store::new(db);
        store.recompute_all_stats().unwrap();

        let summary = store.cleanup_test_data().unwrap();
        assert_eq!(summary.tournaments, 1);
        assert!(store.lock_table().contains_key(&kept_id));
        assert!(!store.lock_table().contains_key(&test_id));
    }
}
