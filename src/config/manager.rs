use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Configuration, PartialConfiguration};
use crate::error::{ChatError, Result};
use crate::fs::atomic_write;
use crate::paths;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Manages loading and saving the persisted generation configuration.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default location.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/llama-chat/config.toml`
    /// or `~/.config/llama-chat/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Self {
        Self::with_path(paths::config_dir().join(CONFIG_FILE_NAME))
    }

    /// Creates a manager for an explicit file location.
    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the persisted document.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet. A document that
    /// cannot be parsed, has unknown keys, or holds out-of-range values is a
    /// [`ChatError::ConfigParse`].
    pub fn load(&self) -> Result<Option<PartialConfiguration>> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no persisted configuration");
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.config_path).map_err(|source| {
            ChatError::ConfigIo {
                path: self.config_path.clone(),
                source,
            }
        })?;

        let loaded: PartialConfiguration =
            toml::from_str(&contents).map_err(|e| ChatError::ConfigParse {
                path: self.config_path.clone(),
                message: e.to_string(),
            })?;

        Configuration::default()
            .merge(&loaded)
            .validate()
            .map_err(|e| ChatError::ConfigParse {
                path: self.config_path.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %self.config_path.display(), ?loaded, "loaded configuration");
        Ok(Some(loaded))
    }

    /// Writes all keys of `config`, replacing whatever was stored before.
    pub fn save(&self, config: &Configuration) -> Result<()> {
        let io_error = |source| ChatError::ConfigIo {
            path: self.config_path.clone(),
            source,
        };

        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let contents = toml::to_string_pretty(config).map_err(|e| ChatError::ConfigParse {
            path: self.config_path.clone(),
            message: e.to_string(),
        })?;

        atomic_write(&self.config_path, &contents).map_err(io_error)?;

        debug!(path = %self.config_path.display(), "saved configuration");
        Ok(())
    }

    /// Loads the persisted document and merges it over `current`.
    ///
    /// Falls back to `current` when nothing has been saved.
    pub fn load_merged(&self, current: &Configuration) -> Result<Configuration> {
        Ok(self
            .load()?
            .map_or(*current, |loaded| current.merge(&loaded)))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
