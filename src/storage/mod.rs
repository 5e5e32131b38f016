//! Storage Layer
//!
//! Resolves the application's config and data folders and the user's photo library.

use anyhow::Result;
use std::path::PathBuf;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "snaptext", "SnapText")
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Get the folder holding the ocrs `.rten` models
pub fn get_models_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("models"))
}

/// The user's picture folder, falling back to the home directory
pub fn default_library_dir() -> Option<PathBuf> {
    let user_dirs = directories::UserDirs::new()?;
    user_dirs
        .picture_dir()
        .map(|p| p.to_path_buf())
        .or_else(|| Some(user_dirs.home_dir().to_path_buf()))
}
