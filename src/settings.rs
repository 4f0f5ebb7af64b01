use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::theme::ThemeId;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "policylens";

/// Environment variable overriding the backend base URL
pub const BACKEND_URL_ENV: &str = "POLICYLENS_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_theme() -> String {
    ThemeId::OceanicNext.name().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: default_theme(),
            backend_url: None,
        }
    }
}

impl Settings {
    pub fn theme_id(&self) -> ThemeId {
        ThemeId::from_name(&self.theme)
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load settings from the user's config directory, writing defaults on first run.
/// Problems are logged and the defaults used.
pub fn load_settings() -> Settings {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return Settings::default();
    };

    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        if let Err(e) = save_settings_to_file(&settings, &path) {
            warn!("{e:#}");
        }
        return settings;
    }

    match load_settings_from_path(&path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{e:#}; using default settings");
            Settings::default()
        }
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {path:?}"))?;
    let mut settings: Settings = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {path:?}"))?;
    debug!("Loaded settings from {path:?}");

    if settings.version < CURRENT_VERSION {
        info!(
            "Migrating settings from v{} to v{}",
            settings.version, CURRENT_VERSION
        );
        settings.version = CURRENT_VERSION;
        save_settings_to_file(&settings, path)?;
    }

    Ok(settings)
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {parent:?}"))?;
        }
    }

    fs::write(path, generate_settings_yaml(settings))
        .with_context(|| format!("Failed to save settings to {path:?}"))?;
    debug!("Saved settings to {path:?}");
    Ok(())
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str(&format!("theme: \"{}\"\n", settings.theme));
    content.push('\n');
    content.push_str(BACKEND_TEMPLATE);
    match &settings.backend_url {
        Some(url) => content.push_str(&format!("backend_url: \"{url}\"\n")),
        None => content.push_str(&format!("# backend_url: \"{DEFAULT_BACKEND_URL}\"\n")),
    }

    content
}

const BACKEND_TEMPLATE: &str = r#"# ============================================================================
# RAG backend
# ============================================================================
# Base URL of the service answering /api/rag/overview and /api/rag/highlight.
# The POLICYLENS_BACKEND_URL environment variable and --backend-url flag
# take precedence over this value.
"#;

/// Where the backend lives. Built once at startup and handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
        }
    }

    /// Flag beats environment beats config file beats the fallback address.
    /// Blank values are skipped.
    pub fn resolve(cli: Option<&str>, env: Option<&str>, settings: &Settings) -> Self {
        let chosen = [cli, env, settings.backend_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BACKEND_URL);
        Self::new(chosen)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backend_url_precedence() {
        let settings = Settings {
            backend_url: Some("http://config:9000".into()),
            ..Settings::default()
        };

        let config = BackendConfig::resolve(Some("http://cli:1/"), Some("http://env:2"), &settings);
        assert_eq!(config.base_url, "http://cli:1");

        let config = BackendConfig::resolve(None, Some("http://env:2"), &settings);
        assert_eq!(config.base_url, "http://env:2");

        let config = BackendConfig::resolve(None, Some("  "), &settings);
        assert_eq!(config.base_url, "http://config:9000");

        let config = BackendConfig::resolve(None, None, &Settings::default());
        assert_eq!(config.base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_settings_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);
        let settings = Settings {
            theme: "Catppuccin Mocha".into(),
            backend_url: Some("https://rag.example.org".into()),
            ..Settings::default()
        };

        save_settings_to_file(&settings, &path).unwrap();
        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.theme_id(), ThemeId::CatppuccinMocha);
    }

    #[test]
    fn test_default_file_leaves_backend_commented_out() {
        let yaml = generate_settings_yaml(&Settings::default());
        assert!(yaml.contains("# backend_url:"));
        let parsed: Settings = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.backend_url.is_none());
    }

    #[test]
    fn test_old_version_is_migrated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "version: 0\ntheme: \"Oceanic Next\"\n").unwrap();

        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with(&format!("version: {CURRENT_VERSION}")));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "theme: [unclosed").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }
}
