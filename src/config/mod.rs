pub mod paths;
pub mod types;

use std::path::Path;

use crate::error::TrayError;

pub use types::{TrayConfig, Verbosity};

impl TrayConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an
    /// error.
    pub fn load(path: &Path) -> Result<Self, TrayError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents).map_err(|e| {
            TrayError::Config(format!("Invalid {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Load from `--config` if given, else from the platform config directory.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, TrayError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(&paths::default_config_path()?),
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, TrayError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
