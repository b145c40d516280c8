// SPDX-License-Identifier: MPL-2.0
//! User preferences persisted to a `settings.toml` file.
//!
//! Missing fields fall back to defaults and unknown fields are ignored, so
//! settings files survive version changes in both directions. Invalid TOML
//! degrades to the default config (the caller decides whether to warn).

use crate::app::paths;
use crate::domain::TOP_K_DEFAULT;
use crate::ui::theme::ThemeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

/// Default URL for the pretrained ViT classification model (ONNX export).
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/WinKawaks/vit-base-patch16-224-onnx/resolve/main/model.onnx";

/// Default URL for the ImageNet-1k label table (synset format).
pub const DEFAULT_LABELS_URL: &str =
    "https://raw.githubusercontent.com/onnx/models/main/validated/vision/classification/synset.txt";

/// Default capture device path used when none is configured.
#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DEVICE: &str = "0";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// UI locale override in BCP-47 form (e.g. `ko`, `en-US`).
    pub language: Option<String>,
    /// Preferred top-K result count, clamped to `[1, 10]` at use sites.
    #[serde(default)]
    pub top_k: Option<u8>,
    /// Light/Dark/System theme preference.
    #[serde(default)]
    pub theme_mode: Option<ThemeMode>,
    /// Override for the classification model download URL.
    #[serde(default)]
    pub model_url: Option<String>,
    /// Override for the label table download URL.
    #[serde(default)]
    pub labels_url: Option<String>,
    /// Expected BLAKE3 hash of the model file. Verified only when set.
    #[serde(default)]
    pub model_checksum: Option<String>,
    /// Capture device path (e.g. `/dev/video0`) for the camera input channel.
    #[serde(default)]
    pub camera_device: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            top_k: Some(TOP_K_DEFAULT),
            theme_mode: Some(ThemeMode::System),
            model_url: None,
            labels_url: None,
            model_checksum: None,
            camera_device: None,
        }
    }
}

impl Config {
    /// The effective model URL (configured or default).
    #[must_use]
    pub fn model_url(&self) -> &str {
        self.model_url.as_deref().unwrap_or(DEFAULT_MODEL_URL)
    }

    /// The effective labels URL (configured or default).
    #[must_use]
    pub fn labels_url(&self) -> &str {
        self.labels_url.as_deref().unwrap_or(DEFAULT_LABELS_URL)
    }

    /// The effective capture device path (configured or platform default).
    #[must_use]
    pub fn camera_device(&self) -> &str {
        self.camera_device
            .as_deref()
            .unwrap_or(DEFAULT_CAMERA_DEVICE)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default location.
///
/// Returns the default config when no file exists or the directory cannot
/// be resolved.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read or parsed.
pub fn load() -> crate::error::Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

/// Saves the configuration to the default location.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be written.
pub fn save(config: &Config) -> crate::error::Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads the configuration from an explicit path (used by tests).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed. Callers fall
/// back to the default config and surface a warning to the user.
pub fn load_from_path(path: &Path) -> crate::error::Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to an explicit path, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_to_path(config: &Config, path: &Path) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_fields() {
        let config = Config {
            language: Some("ko".to_string()),
            top_k: Some(3),
            theme_mode: Some(ThemeMode::Dark),
            model_url: Some("https://example.test/model.onnx".to_string()),
            labels_url: None,
            model_checksum: Some("abc123".to_string()),
            camera_device: Some("/dev/video1".to_string()),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded.language, config.language);
        assert_eq!(loaded.top_k, config.top_k);
        assert_eq!(loaded.model_url, config.model_url);
        assert_eq!(loaded.model_checksum, config.model_checksum);
        assert_eq!(loaded.camera_device, config.camera_device);
    }

    #[test]
    fn load_from_path_reports_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let err = load_from_path(&config_path).expect_err("invalid toml should not parse");
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn default_config_uses_default_urls() {
        let config = Config::default();
        assert_eq!(config.model_url(), DEFAULT_MODEL_URL);
        assert_eq!(config.labels_url(), DEFAULT_LABELS_URL);
        assert!(!config.camera_device().is_empty());
    }

    #[test]
    fn save_to_path_creates_parent_directories() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("deep").join("path").join("settings.toml");

        save_to_path(&Config::default(), &config_path).expect("save should create directories");
        assert!(config_path.exists());
    }
}
