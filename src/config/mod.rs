//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::vision::OcrBackend;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Photo library settings
    pub library: LibrarySettings,
    /// Text recognition settings
    pub recognition: RecognitionSettings,
    /// Main window settings
    pub window: WindowSettings,
}

/// Photo library settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder the picker opens in; the OS picture folder when unset
    pub directory: Option<PathBuf>,
}

/// Text recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// OCR engine to use
    pub backend: OcrBackend,
    /// Language tag for Windows OCR (e.g. "en-US")
    pub language: String,
    /// ocrs text detection model (.rten)
    pub detection_model: Option<PathBuf>,
    /// ocrs text recognition model (.rten)
    pub recognition_model: Option<PathBuf>,
    /// Longest side of the frame handed to the engine; larger images are scaled down
    pub max_image_dimension: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            language: "en-US".to_string(),
            detection_model: None,
            recognition_model: None,
            max_image_dimension: 4096,
        }
    }
}

/// Main window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 640.0,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert!(config.library.directory.is_none());

        assert_eq!(config.recognition.backend, OcrBackend::default());
        assert_eq!(config.recognition.language, "en-US");
        assert!(config.recognition.detection_model.is_none());
        assert!(config.recognition.recognition_model.is_none());
        assert_eq!(config.recognition.max_image_dimension, 4096);

        assert!((config.window.width - 420.0).abs() < 0.01);
        assert!((config.window.height - 640.0).abs() < 0.01);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.library.directory = Some(PathBuf::from("/photos"));
        config.recognition.backend = OcrBackend::Ocrs;
        config.recognition.max_image_dimension = 2000;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.library.directory, Some(PathBuf::from("/photos")));
        assert_eq!(parsed.recognition.backend, OcrBackend::Ocrs);
        assert_eq!(parsed.recognition.max_image_dimension, 2000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [recognition]
            backend = "windows_ocr"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.recognition.backend, OcrBackend::WindowsOcr);
        assert_eq!(parsed.recognition.language, "en-US");
        assert_eq!(parsed.recognition.max_image_dimension, 4096);
        assert!(parsed.library.directory.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.recognition.language = "de-DE".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.recognition.language, "de-DE");
        assert_eq!(loaded.recognition.backend, config.recognition.backend);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
