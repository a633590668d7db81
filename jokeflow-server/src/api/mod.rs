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

pub mod health;
pub mod threads;

pub use health::{health_check, health_check_detailed};
pub use threads::{continue_thread, get_thread_status, list_threads, start_thread};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jokeflow_core::WorkflowError;
use jokeflow_storage::CheckpointStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::controller::SessionController;
use crate::llm::ProviderInfo;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream generation failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(msg) => ApiError::BadRequest(msg),
            WorkflowError::ThreadNotFound(id) => {
                ApiError::NotFound(format!("no workflow found for thread_id: {id}"))
            }
            WorkflowError::InvalidState { thread_id, reason } => {
                ApiError::Conflict(format!("thread {thread_id}: {reason}"))
            }
            WorkflowError::Generation(msg) => ApiError::UpstreamFailure(msg),
            WorkflowError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::UpstreamFailure(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub store: Arc<dyn CheckpointStore>,
    pub providers: Vec<ProviderInfo>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        controller: Arc<SessionController>,
        store: Arc<dyn CheckpointStore>,
        providers: Vec<ProviderInfo>,
    ) -> Self {
        Self {
            controller,
            store,
            providers,
            started_at: Instant::now(),
        }
    }
}
