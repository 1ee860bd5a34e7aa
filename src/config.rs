//! Environment-driven configuration.
//!
//! Every knob has a documented default so the binary runs against a stock
//! local Ollama install with no setup. The binary loads a `.env` file via
//! `dotenvy` before reading these, so either real environment variables or a
//! dotfile work.
//!
//! | variable             | default                  |
//! |----------------------|--------------------------|
//! | `ZEROBOT_MODEL`      | `gemma:2b`               |
//! | `OLLAMA_HOST`        | `http://localhost:11434` |
//! | `ZEROBOT_DATA_DIR`   | `./data`                 |
//! | `ZEROBOT_EMBED_DIM`  | `2048`                   |

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::types::ConfigError;

pub const MODEL_VAR: &str = "ZEROBOT_MODEL";
pub const OLLAMA_HOST_VAR: &str = "OLLAMA_HOST";
pub const DATA_DIR_VAR: &str = "ZEROBOT_DATA_DIR";
pub const EMBED_DIM_VAR: &str = "ZEROBOT_EMBED_DIM";

const DEFAULT_MODEL: &str = "gemma:2b";
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_DATA_DIR: &str = "./data";
/// Embedding width of the default `gemma:2b` model. Ollama does not report
/// the dimension up front and the sqlite vector table needs it at creation,
/// so it is configuration rather than discovery.
pub const DEFAULT_EMBED_DIM: usize = 2048;

const DB_FILE_NAME: &str = "zerobot.sqlite3";

/// Resolved application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Ollama model identifier, used for both embedding and generation.
    pub model: String,
    /// Base URL of the Ollama server.
    pub ollama_host: Url,
    /// Directory holding the vector database file.
    pub data_dir: PathBuf,
    /// Dimension of the embedding vectors produced by `model`.
    pub embed_dim: usize,
}

impl AppConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary lookup function.
    ///
    /// Lets tests supply values without mutating process-wide environment
    /// state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let model = lookup(MODEL_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let host_raw = lookup(OLLAMA_HOST_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
        let ollama_host = Url::parse(&host_raw).map_err(|err| ConfigError::Invalid {
            key: OLLAMA_HOST_VAR.to_string(),
            reason: err.to_string(),
        })?;

        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let embed_dim = match lookup(EMBED_DIM_VAR) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|err| ConfigError::Invalid {
                key: EMBED_DIM_VAR.to_string(),
                reason: err.to_string(),
            })?,
            None => DEFAULT_EMBED_DIM,
        };
        if embed_dim == 0 {
            return Err(ConfigError::Invalid {
                key: EMBED_DIM_VAR.to_string(),
                reason: "embedding dimension must be non-zero".to_string(),
            });
        }

        Ok(Self {
            model,
            ollama_host,
            data_dir,
            embed_dim,
        })
    }

    /// Path of the sqlite database file inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
