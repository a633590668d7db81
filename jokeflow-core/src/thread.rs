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

//! Per-thread checkpoint state and its lifecycle.
//!
//! A thread moves through exactly one linear path:
//!
//! ```text
//! Pending --record_joke--> JokeGenerated --record_explanation--> Completed
//! ```
//!
//! `Completed` is terminal. Restarting a thread means constructing a fresh
//! [`ThreadState`] and overwriting the stored snapshot, never mutating the
//! old one backwards.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};

/// Node name reported by a status read while stage 1 is still pending.
pub const NODE_GENERATE_JOKE: &str = "generate_joke";
/// Node name reported by a status read while stage 2 is still pending.
pub const NODE_GENERATE_EXPLANATION: &str = "generate_explanation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Pending,
    JokeGenerated,
    Completed,
}

impl ThreadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadStatus::Pending => "pending",
            ThreadStatus::JokeGenerated => "joke_generated",
            ThreadStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of persisted data: one snapshot per caller-supplied thread id.
///
/// Field presence tracks status exactly: `joke` is set iff the thread has
/// passed stage 1, `explanation` iff it has passed stage 2. The transition
/// methods are the only mutators, so a state obtained from [`ThreadState::new`]
/// can never violate that pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    pub thread_id: String,
    pub topic: String,
    pub joke: Option<String>,
    pub explanation: Option<String>,
    pub status: ThreadStatus,
    /// Microseconds since the Unix epoch, set at creation.
    pub created_at_us: i64,
    /// Microseconds since the Unix epoch, bumped on every transition.
    pub updated_at_us: i64,
}

impl ThreadState {
    /// Fresh pending state for a new (or restarted) thread.
    pub fn new(thread_id: impl Into<String>, topic: impl Into<String>) -> Self {
        let now = now_us();
        Self {
            thread_id: thread_id.into(),
            topic: topic.into(),
            joke: None,
            explanation: None,
            status: ThreadStatus::Pending,
            created_at_us: now,
            updated_at_us: now,
        }
    }

    /// Stage-1 completion: `Pending -> JokeGenerated`.
    pub fn record_joke(&mut self, joke: impl Into<String>) -> Result<(), WorkflowError> {
        if self.status != ThreadStatus::Pending {
            return Err(WorkflowError::InvalidState {
                thread_id: self.thread_id.clone(),
                reason: format!("cannot record joke in status {}", self.status),
            });
        }
        self.joke = Some(joke.into());
        self.status = ThreadStatus::JokeGenerated;
        self.updated_at_us = now_us();
        Ok(())
    }

    /// Stage-2 completion: `JokeGenerated -> Completed`.
    pub fn record_explanation(
        &mut self,
        explanation: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        if self.status != ThreadStatus::JokeGenerated {
            return Err(WorkflowError::InvalidState {
                thread_id: self.thread_id.clone(),
                reason: format!("cannot record explanation in status {}", self.status),
            });
        }
        self.explanation = Some(explanation.into());
        self.status = ThreadStatus::Completed;
        self.updated_at_us = now_us();
        Ok(())
    }

    pub fn has_joke(&self) -> bool {
        self.joke.is_some()
    }

    pub fn has_explanation(&self) -> bool {
        self.explanation.is_some()
    }

    /// The pipeline node that would run next, or `None` once completed.
    pub fn next_node(&self) -> Option<&'static str> {
        match self.status {
            ThreadStatus::Pending => Some(NODE_GENERATE_JOKE),
            ThreadStatus::JokeGenerated => Some(NODE_GENERATE_EXPLANATION),
            ThreadStatus::Completed => None,
        }
    }
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_thread_is_pending_with_no_content() {
        let state = ThreadState::new("t1", "water");
        assert_eq!(state.status, ThreadStatus::Pending);
        assert!(!state.has_joke());
        assert!(!state.has_explanation());
        assert_eq!(state.next_node(), Some(NODE_GENERATE_JOKE));
    }

    #[test]
    fn linear_lifecycle() {
        let mut state = ThreadState::new("t1", "water");
        state.record_joke("a joke").unwrap();
        assert_eq!(state.status, ThreadStatus::JokeGenerated);
        assert!(state.has_joke());
        assert!(!state.has_explanation());
        assert_eq!(state.next_node(), Some(NODE_GENERATE_EXPLANATION));

        state.record_explanation("because").unwrap();
        assert_eq!(state.status, ThreadStatus::Completed);
        assert!(state.has_explanation());
        assert_eq!(state.next_node(), None);
    }

    #[test]
    fn explanation_before_joke_is_rejected() {
        let mut state = ThreadState::new("t1", "water");
        let err = state.record_explanation("because").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
        assert_eq!(state.status, ThreadStatus::Pending);
        assert!(!state.has_explanation());
    }

    #[test]
    fn double_joke_is_rejected() {
        let mut state = ThreadState::new("t1", "water");
        state.record_joke("first").unwrap();
        let err = state.record_joke("second").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
        assert_eq!(state.joke.as_deref(), Some("first"));
    }

    #[test]
    fn completed_is_terminal() {
        let mut state = ThreadState::new("t1", "water");
        state.record_joke("a joke").unwrap();
        state.record_explanation("because").unwrap();
        assert!(state.record_joke("again").is_err());
        assert!(state.record_explanation("again").is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ThreadStatus::JokeGenerated).unwrap();
        assert_eq!(json, "\"joke_generated\"");
        let back: ThreadStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, ThreadStatus::Completed);
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = ThreadState::new("t1", "water");
        state.record_joke("a joke").unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: ThreadState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
