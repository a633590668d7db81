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

//! In-process checkpoint store. Snapshots do not survive a restart; useful
//! for tests and for the memory-backed server mode.

use async_trait::async_trait;
use dashmap::DashMap;
use jokeflow_core::{Result, ThreadState};

use crate::CheckpointStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: DashMap<String, ThreadState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn put(&self, state: ThreadState) -> Result<()> {
        self.threads.insert(state.thread_id.clone(), state);
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<ThreadState>> {
        Ok(self.threads.get(thread_id).map(|entry| entry.clone()))
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        Ok(self.threads.remove(thread_id).is_some())
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        Ok(self.threads.iter().map(|e| e.key().clone()).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.threads.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
