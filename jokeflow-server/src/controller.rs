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

//! Session controller: maps start/continue/status requests onto pipeline
//! stages and mediates between the checkpoint store and the pipeline.
//!
//! The "interrupt after stage 1" of the original workflow is modeled
//! directly: `start` simply never invokes stage 2, and `resume` picks the
//! thread up from its persisted snapshot. The store handle is passed in
//! explicitly; there is no process-wide singleton.

use std::sync::Arc;

use jokeflow_core::{Result, ThreadState, ThreadStatus, WorkflowError};
use jokeflow_storage::CheckpointStore;
use tracing::{info, warn};

use crate::pipeline::GenerationPipeline;

pub struct SessionController {
    store: Arc<dyn CheckpointStore>,
    pipeline: GenerationPipeline,
}

/// Pure-read view of a thread, derived from its persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub exists: bool,
    pub thread_id: String,
    pub status: Option<ThreadStatus>,
    pub topic: Option<String>,
    pub has_joke: bool,
    pub has_explanation: bool,
    pub next_node: Option<&'static str>,
}

impl StatusReport {
    fn absent(thread_id: &str) -> Self {
        Self {
            exists: false,
            thread_id: thread_id.to_string(),
            status: None,
            topic: None,
            has_joke: false,
            has_explanation: false,
            next_node: None,
        }
    }
}

impl SessionController {
    pub fn new(store: Arc<dyn CheckpointStore>, pipeline: GenerationPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Run stage 1 for a new thread and persist the interrupted state.
    ///
    /// An existing snapshot for `thread_id` is unconditionally replaced:
    /// restart semantics, no merge, no conflict error. Nothing is persisted
    /// if the generation call fails.
    pub async fn start(&self, topic: &str, thread_id: &str) -> Result<ThreadState> {
        let topic = topic.trim();
        let thread_id = thread_id.trim();
        if topic.is_empty() {
            return Err(WorkflowError::Validation("topic must not be empty".into()));
        }
        if thread_id.is_empty() {
            return Err(WorkflowError::Validation(
                "thread_id must not be empty".into(),
            ));
        }

        info!(thread_id, topic, "Starting joke generation");

        if self.store.get(thread_id).await?.is_some() {
            warn!(thread_id, "Existing thread restarted; prior state discarded");
        }

        let mut state = ThreadState::new(thread_id, topic);
        let joke = self.pipeline.generate_joke(topic).await?;
        state.record_joke(joke)?;
        self.store.put(state.clone()).await?;

        info!(thread_id, "Joke generated; awaiting continue");
        Ok(state)
    }

    /// Resume an interrupted thread: run stage 2 from the stored joke.
    ///
    /// Resuming an already-completed thread is an idempotent re-fetch of the
    /// stored result; no generation call is made and nothing is overwritten.
    pub async fn resume(&self, thread_id: &str) -> Result<ThreadState> {
        let mut state = self
            .store
            .get(thread_id)
            .await?
            .ok_or_else(|| WorkflowError::ThreadNotFound(thread_id.to_string()))?;

        match state.status {
            ThreadStatus::Pending => {
                return Err(WorkflowError::InvalidState {
                    thread_id: thread_id.to_string(),
                    reason: "no joke to explain; stage 1 never completed".into(),
                });
            }
            ThreadStatus::Completed => {
                info!(thread_id, "Thread already completed; returning stored result");
                return Ok(state);
            }
            ThreadStatus::JokeGenerated => {}
        }

        info!(thread_id, "Continuing workflow");

        // Invariant: JokeGenerated implies the joke is present.
        let joke = state.joke.clone().ok_or_else(|| WorkflowError::Storage(format!(
            "corrupt snapshot for thread {thread_id}: joke_generated without a joke"
        )))?;

        let explanation = self.pipeline.generate_explanation(&joke).await?;
        state.record_explanation(explanation)?;
        self.store.put(state.clone()).await?;

        info!(thread_id, "Explanation generated; thread completed");
        Ok(state)
    }

    /// Pure read of persisted state. Never invokes the pipeline.
    pub async fn status(&self, thread_id: &str) -> Result<StatusReport> {
        let state = match self.store.get(thread_id).await? {
            Some(state) => state,
            None => return Ok(StatusReport::absent(thread_id)),
        };

        Ok(StatusReport {
            exists: true,
            thread_id: state.thread_id.clone(),
            status: Some(state.status),
            topic: Some(state.topic.clone()),
            has_joke: state.has_joke(),
            has_explanation: state.has_explanation(),
            next_node: state.next_node(),
        })
    }

    pub async fn list_threads(&self) -> Result<Vec<String>> {
        self.store.list_threads().await
    }

    pub async fn thread_count(&self) -> Result<usize> {
        self.store.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FailingProvider, ScriptedProvider};
    use jokeflow_storage::MemoryStore;

    fn controller_with(responses: Vec<&str>) -> SessionController {
        let store = Arc::new(MemoryStore::new());
        let pipeline = GenerationPipeline::new(Arc::new(ScriptedProvider::new(responses)), None);
        SessionController::new(store, pipeline)
    }

    #[tokio::test]
    async fn start_runs_stage_one_only() {
        let controller = controller_with(vec!["a fish joke"]);

        let state = controller.start("water", "t1").await.unwrap();
        assert_eq!(state.status, ThreadStatus::JokeGenerated);
        assert_eq!(state.joke.as_deref(), Some("a fish joke"));
        assert!(state.explanation.is_none());

        let report = controller.status("t1").await.unwrap();
        assert!(report.exists);
        assert_eq!(report.status, Some(ThreadStatus::JokeGenerated));
        assert!(report.has_joke);
        assert!(!report.has_explanation);
        assert_eq!(report.next_node, Some("generate_explanation"));
    }

    #[tokio::test]
    async fn resume_completes_the_thread() {
        let controller = controller_with(vec!["a fish joke", "because sea weed"]);

        controller.start("water", "t1").await.unwrap();
        let state = controller.resume("t1").await.unwrap();
        assert_eq!(state.status, ThreadStatus::Completed);
        assert_eq!(state.joke.as_deref(), Some("a fish joke"));
        assert_eq!(state.explanation.as_deref(), Some("because sea weed"));

        let report = controller.status("t1").await.unwrap();
        assert_eq!(report.status, Some(ThreadStatus::Completed));
        assert!(report.has_explanation);
        assert_eq!(report.next_node, None);
    }

    #[tokio::test]
    async fn resume_unknown_thread_is_not_found() {
        let controller = controller_with(vec![]);
        let err = controller.resume("ghost").await.unwrap_err();
        assert!(matches!(err, WorkflowError::ThreadNotFound(_)));
    }

    #[tokio::test]
    async fn resume_pending_thread_is_invalid_state() {
        let store = Arc::new(MemoryStore::new());
        // A pending snapshot can only exist if stage 1 never ran to
        // completion; seed one directly.
        store.put(ThreadState::new("t1", "water")).await.unwrap();
        let pipeline =
            GenerationPipeline::new(Arc::new(ScriptedProvider::new(vec!["unused"])), None);
        let controller = SessionController::new(store, pipeline);

        let err = controller.resume("t1").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn resume_completed_thread_is_idempotent() {
        let controller = controller_with(vec!["a fish joke", "because sea weed"]);

        controller.start("water", "t1").await.unwrap();
        let first = controller.resume("t1").await.unwrap();
        // The scripted provider has no responses left; a second generation
        // call would fail, so success proves none was made.
        let second = controller.resume("t1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn start_validates_inputs() {
        let controller = controller_with(vec!["unused"]);
        assert!(matches!(
            controller.start("", "t1").await.unwrap_err(),
            WorkflowError::Validation(_)
        ));
        assert!(matches!(
            controller.start("water", "  ").await.unwrap_err(),
            WorkflowError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn failed_generation_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = GenerationPipeline::new(Arc::new(FailingProvider), None);
        let controller = SessionController::new(store.clone(), pipeline);

        let err = controller.start("water", "t1").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Generation(_)));
        assert!(store.get("t1").await.unwrap().is_none());

        let report = controller.status("t1").await.unwrap();
        assert!(!report.exists);
    }

    #[tokio::test]
    async fn restart_discards_prior_thread_state() {
        let controller = controller_with(vec![
            "water joke",
            "water explanation",
            "cat joke",
        ]);

        controller.start("water", "t1").await.unwrap();
        controller.resume("t1").await.unwrap();

        // Destructive restart with a different topic
        controller.start("cats", "t1").await.unwrap();

        let report = controller.status("t1").await.unwrap();
        assert_eq!(report.topic.as_deref(), Some("cats"));
        assert_eq!(report.status, Some(ThreadStatus::JokeGenerated));
        assert!(report.has_joke);
        assert!(!report.has_explanation);

        let state = controller.resume("t1").await.err();
        // Only "cat joke" was scripted; the explanation call fails, which
        // proves resume used the new joke rather than the old thread.
        assert!(state.is_some());
    }

    #[tokio::test]
    async fn threads_do_not_cross_contaminate() {
        let controller = controller_with(vec!["water joke", "cat joke"]);

        controller.start("water", "t1").await.unwrap();
        controller.start("cats", "t2").await.unwrap();

        let r1 = controller.status("t1").await.unwrap();
        let r2 = controller.status("t2").await.unwrap();
        assert_eq!(r1.topic.as_deref(), Some("water"));
        assert_eq!(r2.topic.as_deref(), Some("cats"));

        let mut ids = controller.list_threads().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(controller.thread_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn status_on_unknown_thread_reports_absent() {
        let controller = controller_with(vec![]);
        let report = controller.status("ghost").await.unwrap();
        assert!(!report.exists);
        assert!(report.status.is_none());
        assert!(!report.has_joke);
        assert!(!report.has_explanation);
        assert!(report.next_node.is_none());
    }
}
