//! Platform-specific config directory helpers.
//!
//! Uses the `dirs` crate to resolve platform-appropriate directories:
//! - Linux:   `~/.config/transfer-tray/`
//! - Windows: `%APPDATA%\transfer-tray\`
//! - macOS:   `~/Library/Application Support/transfer-tray/`

use std::path::PathBuf;

use crate::error::TrayError;

const APP_DIR: &str = "transfer-tray";

/// Get the config directory, creating it if needed.
pub fn tray_config_dir() -> Result<PathBuf, TrayError> {
    let base = dirs::config_dir()
        .ok_or_else(|| TrayError::Config("Could not determine config directory".into()))?;
    let dir = base.join(APP_DIR);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Default location of `config.toml`.
pub fn default_config_path() -> Result<PathBuf, TrayError> {
    Ok(tray_config_dir()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_lives_in_app_dir() {
        let path = default_config_path().expect("should resolve config dir");
        assert!(path.ends_with("transfer-tray/config.toml"));
        assert!(path.parent().unwrap().exists());
    }
}
