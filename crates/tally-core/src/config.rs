use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::persist::{
    Backend, DEFAULT_KEY, FileStorage, MemoryStorage, PersistenceAdapter, SqliteStorage,
};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            backend: BackendConfig::default(),
        }
    }
}

/// Where the item snapshot is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    File {
        dir: PathBuf,
    },
    Sqlite {
        path: PathBuf,
    },
}

fn default_storage_key() -> String {
    DEFAULT_KEY.to_string()
}

/// Load a config file. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<TallyConfig> {
    if !path.exists() {
        return Ok(TallyConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TallyConfig>(&content).with_context(|| {
        let code = ErrorCode::ConfigParseError;
        format!("{code}: {} at {}", code.message(), path.display())
    })
}

/// Load `<config_dir>/tally/config.toml`, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<TallyConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(TallyConfig::default());
    };
    load_config(&config_dir.join("tally/config.toml"))
}

/// Build the configured storage substrate.
///
/// # Errors
///
/// Returns an error if a file or SQLite backend cannot be opened.
pub fn open_backend(config: &BackendConfig) -> Result<Backend> {
    let backend = match config {
        BackendConfig::Memory => Backend::Memory(MemoryStorage::new()),
        BackendConfig::File { dir } => Backend::File(
            FileStorage::open(dir.clone())
                .with_context(|| format!("Failed to open file storage {}", dir.display()))?,
        ),
        BackendConfig::Sqlite { path } => Backend::Sqlite(
            SqliteStorage::open(path)
                .with_context(|| format!("Failed to open sqlite storage {}", path.display()))?,
        ),
    };
    Ok(backend)
}

/// Open the configured backend and start a session over its slot.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened or the stored snapshot
/// cannot be loaded.
pub fn open_session(config: &TallyConfig) -> Result<Session<Backend>> {
    let backend = open_backend(&config.backend)?;
    let adapter = PersistenceAdapter::with_key(backend, config.storage_key.clone());
    Session::open(adapter)
        .with_context(|| format!("Failed to load items from slot {:?}", config.storage_key))
}
