/// Config store: read/write `~/.validkit/config.json`.
///
/// The file is a flat JSON object holding at least `apiKey`. Updates are
/// read-merge-write with no locking; the last writer wins.
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides the stored key.
pub const API_KEY_ENV: &str = "VALIDKIT_API_KEY";

const API_KEY_FIELD: &str = "apiKey";
const CONFIG_PATH_FIELD: &str = "configPath";

/// Errors writing or removing the config file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure on the config file or its directory.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (`create`, `write`, `remove`).
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The merged document could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where an effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The `VALIDKIT_API_KEY` environment variable.
    Environment,
    /// The config file at this path.
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment Variable"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Effective configuration plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub api_key: Option<String>,
    pub source: ConfigSource,
}

/// Partial update applied by [`ConfigStore::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
}

impl ConfigUpdate {
    /// Update that sets only the API key.
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }
}

/// Handle on the config file and the environment override.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    env_key: Option<String>,
}

/// Return the default config file path (`~/.validkit/config.json`).
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".validkit")
        .join("config.json")
}

impl ConfigStore {
    /// Store backed by `path`, with no environment override.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_key: None,
        }
    }

    /// Store at the default path, honouring `VALIDKIT_API_KEY`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(default_config_path()).with_env_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Replace the environment override. Empty values count as unset.
    #[must_use]
    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        self.env_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the effective configuration. Never fails.
    ///
    /// The environment override wins without reading the file. A missing
    /// or malformed file yields an empty configuration.
    #[must_use]
    pub fn load(&self) -> Configuration {
        if let Some(key) = &self.env_key {
            return Configuration {
                api_key: Some(key.clone()),
                source: ConfigSource::Environment,
            };
        }

        let api_key = self
            .read_document()
            .and_then(|doc| match doc.get(API_KEY_FIELD) {
                Some(Value::String(key)) if !key.is_empty() => Some(key.clone()),
                _ => None,
            });

        Configuration {
            api_key,
            source: ConfigSource::File(self.path.clone()),
        }
    }

    /// Merge `update` over the stored document and write it back.
    ///
    /// Unknown keys in the existing file are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, update: &ConfigUpdate) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                action: "create",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut doc = self.read_document().unwrap_or_default();
        if let Some(key) = &update.api_key {
            doc.insert(API_KEY_FIELD.to_owned(), Value::String(key.clone()));
        }
        doc.remove(CONFIG_PATH_FIELD);

        let text = serde_json::to_string_pretty(&Value::Object(doc))?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            action: "write",
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Delete the config file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be removed.
    pub fn reset(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "config removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                action: "remove",
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn read_document(&self) -> Option<Map<String, Value>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(Value::Object(doc)) => Some(doc),
            Ok(_) | Err(_) => {
                debug!(path = %self.path.display(), "ignoring unreadable config file");
                None
            }
        }
    }
}
