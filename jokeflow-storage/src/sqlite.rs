// Copyright 2025 Jokeflow Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! SQLite-backed checkpoint store.
//!
//! One row per thread id; the full [`ThreadState`] is serialized into a JSON
//! column and replaced wholesale on every put (`INSERT OR REPLACE`), which is
//! what gives the store its per-snapshot atomicity. Status and update time
//! are mirrored into scalar columns so operators can inspect the table
//! without unpacking JSON. Connections come from an r2d2 pool and all
//! blocking work runs on the tokio blocking pool.

use std::path::Path;

use async_trait::async_trait;
use jokeflow_core::{Result, ThreadState, WorkflowError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

use crate::CheckpointStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS thread_checkpoints (
    thread_id     TEXT PRIMARY KEY,
    status        TEXT NOT NULL,
    state_json    TEXT NOT NULL,
    updated_at_us INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_checkpoints_status ON thread_checkpoints (status);
";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) the checkpoint database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .map_err(storage_err)?;

        let conn = pool.get().map_err(storage_err)?;
        conn.execute_batch(SCHEMA).map_err(storage_err)?;
        debug!(path = %path.as_ref().display(), "sqlite checkpoint store opened");

        Ok(Self { pool })
    }

    fn pool(&self) -> Pool<SqliteConnectionManager> {
        self.pool.clone()
    }
}

#[async_trait]
impl CheckpointStore for SqliteStore {
    async fn put(&self, state: ThreadState) -> Result<()> {
        let pool = self.pool();
        tokio::task::spawn_blocking(move || {
            let json = serde_json::to_string(&state).map_err(storage_err)?;
            let conn = pool.get().map_err(storage_err)?;
            conn.execute(
                "INSERT OR REPLACE INTO thread_checkpoints
                     (thread_id, status, state_json, updated_at_us)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    state.thread_id,
                    state.status.as_str(),
                    json,
                    state.updated_at_us
                ],
            )
            .map_err(storage_err)?;
            Ok(())
        })
        .await
        .map_err(storage_err)?
    }

    async fn get(&self, thread_id: &str) -> Result<Option<ThreadState>> {
        let pool = self.pool();
        let thread_id = thread_id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_err)?;
            let mut stmt = conn
                .prepare("SELECT state_json FROM thread_checkpoints WHERE thread_id = ?1")
                .map_err(storage_err)?;
            let json: Option<String> = stmt
                .query_row(params![thread_id], |row| row.get(0))
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })
                .map_err(storage_err)?;
            match json {
                Some(json) => {
                    let state = serde_json::from_str(&json).map_err(storage_err)?;
                    Ok(Some(state))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(storage_err)?
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        let pool = self.pool();
        let thread_id = thread_id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_err)?;
            let deleted = conn
                .execute(
                    "DELETE FROM thread_checkpoints WHERE thread_id = ?1",
                    params![thread_id],
                )
                .map_err(storage_err)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(storage_err)?
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let pool = self.pool();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_err)?;
            let mut stmt = conn
                .prepare("SELECT thread_id FROM thread_checkpoints ORDER BY updated_at_us DESC")
                .map_err(storage_err)?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(storage_err)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(storage_err)?;
            Ok(ids)
        })
        .await
        .map_err(storage_err)?
    }

    async fn count(&self) -> Result<usize> {
        let pool = self.pool();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(storage_err)?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM thread_checkpoints", [], |row| {
                    row.get(0)
                })
                .map_err(storage_err)?;
            Ok(count as usize)
        })
        .await
        .map_err(storage_err)?
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn storage_err<E: std::fmt::Display>(e: E) -> WorkflowError {
    WorkflowError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("checkpoints.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let (_dir, store) = temp_store();
        let mut state = ThreadState::new("t1", "water");
        state.record_joke("a joke").unwrap();
        state.record_explanation("because").unwrap();

        store.put(state.clone()).await.unwrap();
        let loaded = store.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn unknown_thread_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_prior_snapshot() {
        let (_dir, store) = temp_store();
        let mut first = ThreadState::new("t1", "water");
        first.record_joke("old joke").unwrap();
        store.put(first).await.unwrap();

        store.put(ThreadState::new("t1", "cats")).await.unwrap();

        let loaded = store.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded.topic, "cats");
        assert!(loaded.joke.is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn snapshots_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoints.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let mut state = ThreadState::new("t1", "water");
            state.record_joke("a joke").unwrap();
            store.put(state).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded.joke.as_deref(), Some("a joke"));
    }

    #[tokio::test]
    async fn list_and_delete() {
        let (_dir, store) = temp_store();
        store.put(ThreadState::new("t1", "water")).await.unwrap();
        store.put(ThreadState::new("t2", "cats")).await.unwrap();

        let mut ids = store.list_threads().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["t1".to_string(), "t2".to_string()]);

        assert!(store.delete("t1").await.unwrap());
        assert!(!store.delete("t1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
