use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::persist::ENTRIES_KEY;
use crate::utils::paths;

/// Global settings stored in ~/.docker-wizard/settings.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Registry used for image and tag suggestions
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Slot holding the saved entries
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

/// Registry lookup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Registry API base URL
    pub base_url: String,

    /// Maximum results per query
    pub page_size: u32,

    /// Queries shorter than this are not sent
    pub min_query_len: usize,

    /// Quiet period before a lookup fires
    pub debounce_ms: u64,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Set to false to never contact the registry
    pub enabled: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: "https://hub.docker.com".to_string(),
            page_size: 10,
            min_query_len: 4,
            debounce_ms: 450,
            timeout_secs: 10,
            enabled: true,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: RegistrySettings::default(),
            storage_key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    ENTRIES_KEY.to_string()
}

impl Settings {
    /// Load settings from disk, creating default if not exists
    pub fn load(home: &Path) -> Result<Self> {
        let settings_path = paths::get_settings_file(home)?;

        if !settings_path.exists() {
            let settings = Self::default();
            settings.save(home)?;
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read settings: {}", settings_path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", settings_path.display()))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, home: &Path) -> Result<()> {
        let settings_path = paths::get_settings_file(home)?;

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write settings: {}", settings_path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();

        assert_eq!(settings.storage_key, "docker-wizard-entries-v1");
        assert_eq!(settings.registry.debounce_ms, 450);
        assert!(dir.path().join("settings.yaml").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.yaml"),
            "registry:\n  enabled: false\n  page_size: 25\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert!(!settings.registry.enabled);
        assert_eq!(settings.registry.page_size, 25);
        assert_eq!(settings.registry.min_query_len, 4);
        assert_eq!(settings.storage_key, "docker-wizard-entries-v1");
    }
}
