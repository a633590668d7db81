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

//! Jokeflow Storage
//!
//! Durable checkpoint store: the latest [`ThreadState`] snapshot per thread
//! id, behind a trait so the session controller never knows which backend
//! it is talking to. Two backends ship: an in-process [`MemoryStore`] and a
//! SQLite-backed [`SqliteStore`].

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use jokeflow_core::{Result, ThreadState};

/// Durable key-value store mapping a thread id to its latest snapshot.
///
/// Writes are atomic per snapshot; there is no cross-operation locking, so
/// two racing writers for the same thread id resolve last-writer-wins.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persist the full snapshot, replacing any previous one for the id.
    async fn put(&self, state: ThreadState) -> Result<()>;

    /// Latest snapshot for the id, or `None` if the thread was never started.
    async fn get(&self, thread_id: &str) -> Result<Option<ThreadState>>;

    /// Remove a snapshot. Returns whether one existed.
    async fn delete(&self, thread_id: &str) -> Result<bool>;

    /// All persisted thread ids.
    async fn list_threads(&self) -> Result<Vec<String>>;

    /// Number of persisted threads.
    async fn count(&self) -> Result<usize>;

    /// Short backend label for health reporting ("memory", "sqlite").
    fn backend_name(&self) -> &'static str;
}
