use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BACKEND_URL_ENV: &str = "STRIKE_BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub default_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            request_timeout_secs: 30,
            default_currency: "USD".to_string(),
        }
    }
}

impl AppConfig {
    /// Directory used when not running inside the app shell.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("strike")
    }

    pub fn load_default() -> Self {
        Self::load(&Self::default_dir())
    }

    pub fn load(app_data: &Path) -> Self {
        let config_path = app_data.join("config.json");
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("Ignoring unreadable {}: {}", config_path.display(), e);
                    Self::default()
                }),
                Err(_) => Self::default(),
            }
        } else {
            let c = Self::default();
            if let Err(e) = c.save(app_data) {
                log::warn!("Could not write default config: {:#}", e);
            }
            c
        };

        // The environment wins over the stored URL
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.backend_url = url.trim().to_string();
            }
        }

        config.backend_url = config.backend_url.trim_end_matches('/').to_string();
        config
    }

    pub fn save(&self, app_data: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(app_data)
            .with_context(|| format!("creating {}", app_data.display()))?;
        let config_path = app_data.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("writing {}", config_path.display()))?;
        Ok(())
    }
}

#[cfg(feature = "desktop")]
pub mod commands {
    use super::AppConfig;
    use crate::CrmClient;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tauri::Manager;

    pub type ConfigState = Arc<Mutex<AppConfig>>;

    #[tauri::command]
    pub fn get_config(config: tauri::State<'_, ConfigState>) -> AppConfig {
        config.lock().clone()
    }

    #[tauri::command]
    pub fn update_config(
        app: tauri::AppHandle,
        config_state: tauri::State<'_, ConfigState>,
        client: tauri::State<'_, CrmClient>,
        new_config: AppConfig,
    ) -> Result<(), String> {
        let app_data = app
            .path()
            .app_data_dir()
            .map_err(|e: tauri::Error| e.to_string())?;
        new_config.save(&app_data).map_err(|e| format!("{:#}", e))?;
        client
            .gateway()
            .reconfigure(&new_config)
            .map_err(|e| e.to_string())?;
        *config_state.lock() = new_config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_is_app_specific() {
        assert!(AppConfig::default_dir().ends_with("strike"));
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path());
        assert_eq!(config.request_timeout_secs, 30);
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn saved_values_are_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            backend_url: "https://crm.example.com".to_string(),
            request_timeout_secs: 5,
            default_currency: "EUR".to_string(),
        };
        config.save(dir.path()).unwrap();
        let loaded = AppConfig::load(dir.path());
        assert_eq!(loaded.request_timeout_secs, 5);
        assert_eq!(loaded.default_currency, "EUR");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        let loaded = AppConfig::load(dir.path());
        assert_eq!(loaded.default_currency, "USD");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"request_timeout_secs": 9}"#).unwrap();
        let loaded = AppConfig::load(dir.path());
        assert_eq!(loaded.request_timeout_secs, 9);
        assert_eq!(loaded.default_currency, "USD");
    }
}
