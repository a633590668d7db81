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

//! Workflow error kinds.
//!
//! Every request fails independently: none of these abort the process or
//! trigger retries. The server layer maps each variant to an HTTP status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The opaque text-generation call failed or timed out. Propagated,
    /// never retried.
    #[error("generation failed: {0}")]
    Generation(String),

    /// continue/status referenced a thread id that was never started.
    #[error("no workflow found for thread_id: {0}")]
    ThreadNotFound(String),

    /// The operation is not valid for the thread's current status, e.g.
    /// continue before stage 1 completed.
    #[error("invalid state for thread {thread_id}: {reason}")]
    InvalidState { thread_id: String, reason: String },

    /// Missing or empty request field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The checkpoint store failed to read or write a snapshot.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
