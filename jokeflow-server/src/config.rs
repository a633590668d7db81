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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Jokeflow Server Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:47200")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

/// Which checkpoint backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process only; checkpoints are lost on restart.
    Memory,
    /// SQLite file under `data_dir`.
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Checkpoint backend selection
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Path to the data directory (sqlite backend only)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider used by the generation pipeline ("gemini", "openai", "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Ollama base URL (e.g., "http://localhost:11434")
    pub ollama_base_url: Option<String>,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:47200".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./jokeflow-data")
}

fn default_provider() -> String {
    "gemini".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            gemini_api_key: None,
            openai_api_key: None,
            ollama_base_url: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            storage: StorageConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - JOKEFLOW_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:47200)
    /// - JOKEFLOW_DATA_DIR: Data directory path (default: ./jokeflow-data)
    /// - JOKEFLOW_STORAGE_BACKEND: "memory" or "sqlite" (default: sqlite)
    /// - JOKEFLOW_ENABLE_CORS: Enable CORS (default: true)
    /// - JOKEFLOW_LLM_PROVIDER: Pipeline provider id (default: gemini)
    /// - JOKEFLOW_LLM_MODEL: Model override
    /// - GEMINI_API_KEY / GOOGLE_API_KEY: Gemini credentials
    /// - OPENAI_API_KEY: OpenAI credentials
    /// - OLLAMA_BASE_URL: Ollama endpoint
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("JOKEFLOW_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(cors) = std::env::var("JOKEFLOW_ENABLE_CORS") {
            config.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Ok(data_dir) = std::env::var("JOKEFLOW_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(backend) = std::env::var("JOKEFLOW_STORAGE_BACKEND") {
            match backend.to_lowercase().as_str() {
                "memory" => config.storage.backend = StorageBackend::Memory,
                "sqlite" => config.storage.backend = StorageBackend::Sqlite,
                other => {
                    tracing::warn!("Unknown storage backend '{}', keeping default", other);
                }
            }
        }

        if let Ok(provider) = std::env::var("JOKEFLOW_LLM_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("JOKEFLOW_LLM_MODEL") {
            config.llm.model = Some(model);
        }

        // GEMINI_API_KEY preferred; GOOGLE_API_KEY kept for compatibility
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.gemini_api_key = Some(key);
        } else if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            config.llm.gemini_api_key = Some(key);
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }

        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            config.llm.ollama_base_url = Some(base_url);
        }

        config
    }

    /// Load configuration with priority: file > env > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config = Self::merge_with_env(config);

        Ok(config)
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        if std::env::var("JOKEFLOW_HTTP_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if std::env::var("JOKEFLOW_DATA_DIR").is_ok() {
            config.storage.data_dir = env_config.storage.data_dir;
        }
        if std::env::var("JOKEFLOW_STORAGE_BACKEND").is_ok() {
            config.storage.backend = env_config.storage.backend;
        }
        if std::env::var("JOKEFLOW_LLM_PROVIDER").is_ok() {
            config.llm.provider = env_config.llm.provider;
        }
        if std::env::var("JOKEFLOW_LLM_MODEL").is_ok() {
            config.llm.model = env_config.llm.model;
        }
        if config.llm.gemini_api_key.is_none() {
            config.llm.gemini_api_key = env_config.llm.gemini_api_key;
        }
        if config.llm.openai_api_key.is_none() {
            config.llm.openai_api_key = env_config.llm.openai_api_key;
        }
        if config.llm.ollama_base_url.is_none() {
            config.llm.ollama_base_url = env_config.llm.ollama_base_url;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.storage.backend == StorageBackend::Sqlite && !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:47200");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [server]
            listen_addr = "0.0.0.0:9000"

            [storage]
            backend = "memory"

            [llm]
            provider = "ollama"
            model = "llama2"
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama2"));
    }

    #[test]
    fn test_invalid_addr_fails_validation() {
        let mut config = ServerConfig::default();
        config.server.listen_addr = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }
}
