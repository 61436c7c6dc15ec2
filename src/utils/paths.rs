use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the data directory: an explicit override, else ~/.docker-wizard
pub fn get_config_dir(home_override: Option<&Path>) -> Result<PathBuf> {
    let config_dir = match home_override {
        Some(dir) => dir.to_path_buf(),
        None => dirs::home_dir()
            .context("Could not find home directory")?
            .join(".docker-wizard"),
    };
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    Ok(config_dir)
}

/// Get the settings file path
pub fn get_settings_file(home: &Path) -> Result<PathBuf> {
    Ok(home.join("settings.yaml"))
}

/// Get the directory holding persisted key-value slots
pub fn get_slots_dir(home: &Path) -> Result<PathBuf> {
    let slots_dir = home.join("slots");
    std::fs::create_dir_all(&slots_dir)
        .with_context(|| format!("Failed to create {}", slots_dir.display()))?;
    Ok(slots_dir)
}
