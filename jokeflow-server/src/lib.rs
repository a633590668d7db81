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

//! Jokeflow Server
//!
//! HTTP surface for the interruptible joke-generation workflow: wires the
//! checkpoint store, the LLM provider, the generation pipeline and the
//! session controller together and serves the thread lifecycle API.

pub mod api;
pub mod config;
pub mod controller;
pub mod llm;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testutil;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::{ServerConfig, StorageBackend};
use controller::SessionController;
use jokeflow_storage::{CheckpointStore, MemoryStore, SqliteStore};
use pipeline::GenerationPipeline;

/// Build the API router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/v1/health", get(api::health_check_detailed))
        .route("/api/v1/threads", get(api::list_threads))
        .route("/api/v1/threads/start", post(api::start_thread))
        .route("/api/v1/threads/continue", post(api::continue_thread))
        .route(
            "/api/v1/threads/:thread_id/status",
            get(api::get_thread_status),
        )
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jokeflow_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Jokeflow Server");
    tracing::info!("Configuration: {:#?}", config);

    config.validate()?;

    // Open the checkpoint store
    let store: Arc<dyn CheckpointStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory checkpoint store (no persistence across restarts)");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Sqlite => {
            let path = config.storage.data_dir.join("checkpoints.db");
            tracing::info!("Opening sqlite checkpoint store at: {:?}", path);
            Arc::new(SqliteStore::open(path)?)
        }
    };

    // Initialize LLM providers and pick the configured one for the pipeline
    let llm_manager = llm::LlmProviderManager::new(&config.llm)?;
    let provider = llm_manager.default_provider()?;
    tracing::info!(
        provider = provider.name(),
        model = ?config.llm.model,
        "Generation pipeline initialized"
    );

    let pipeline = GenerationPipeline::new(provider, config.llm.model.clone());
    let controller = Arc::new(SessionController::new(store.clone(), pipeline));
    let state = AppState::new(controller, store, llm_manager.list_providers());

    let app = router(state)
        .layer(if config.server.enable_cors {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
