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

//! Thread lifecycle endpoints: start, continue, status, list.

use axum::{
    extract::{Path, State},
    Json,
};
use jokeflow_core::ThreadStatus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub topic: String,
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ContinueRequest {
    pub thread_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub thread_id: String,
    pub topic: String,
    pub joke: String,
    pub status: ThreadStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ContinueResponse {
    pub success: bool,
    pub thread_id: String,
    pub topic: String,
    pub joke: String,
    pub explanation: String,
    pub status: ThreadStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub exists: bool,
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ThreadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub has_joke: bool,
    pub has_explanation: bool,
    pub next_node: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ListThreadsResponse {
    pub success: bool,
    pub threads: Vec<String>,
    pub count: usize,
}

/// POST /api/v1/threads/start - Run stage 1 and pause.
///
/// Restarts destructively if the thread id already exists.
pub async fn start_thread(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<StartResponse>, ApiError> {
    debug!(thread_id = %req.thread_id, topic = %req.topic, "start requested");

    let thread = state.controller.start(&req.topic, &req.thread_id).await?;

    // record_joke ran, so the joke is present
    let joke = thread.joke.clone().unwrap_or_default();

    Ok(Json(StartResponse {
        success: true,
        thread_id: thread.thread_id,
        topic: thread.topic,
        joke,
        status: thread.status,
        message: "Joke generated. Call continue to get the explanation.",
    }))
}

/// POST /api/v1/threads/continue - Resume an interrupted thread (stage 2).
///
/// Continuing an already-completed thread re-returns the stored result.
pub async fn continue_thread(
    State(state): State<AppState>,
    Json(req): Json<ContinueRequest>,
) -> Result<Json<ContinueResponse>, ApiError> {
    debug!(thread_id = %req.thread_id, "continue requested");

    let thread = state.controller.resume(&req.thread_id).await?;

    let joke = thread.joke.clone().unwrap_or_default();
    let explanation = thread.explanation.clone().unwrap_or_default();

    Ok(Json(ContinueResponse {
        success: true,
        thread_id: thread.thread_id,
        topic: thread.topic,
        joke,
        explanation,
        status: thread.status,
        message: "Explanation generated. Thread completed.",
    }))
}

/// GET /api/v1/threads/:thread_id/status - Pure read of persisted state.
///
/// Unknown threads report `exists: false` rather than an error.
pub async fn get_thread_status(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    debug!(thread_id = %thread_id, "status requested");

    let report = state.controller.status(&thread_id).await?;

    Ok(Json(StatusResponse {
        success: true,
        exists: report.exists,
        thread_id: report.thread_id,
        status: report.status,
        topic: report.topic,
        has_joke: report.has_joke,
        has_explanation: report.has_explanation,
        next_node: report.next_node,
    }))
}

/// GET /api/v1/threads - All persisted thread ids.
pub async fn list_threads(
    State(state): State<AppState>,
) -> Result<Json<ListThreadsResponse>, ApiError> {
    let threads = state.controller.list_threads().await?;
    let count = threads.len();

    Ok(Json(ListThreadsResponse {
        success: true,
        threads,
        count,
    }))
}
