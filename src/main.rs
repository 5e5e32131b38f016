//! SnapText - Pick a photo, read its text
//!
//! A small desktop tool that recognizes the printed text in an image from
//! the photo library and lets the user copy it to the clipboard.

mod clipboard;
mod config;
mod picker;
mod shared;
mod storage;
mod ui;
mod vision;

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::vision::OcrBackend;

/// SnapText - Extract text from photos
#[derive(Parser, Debug)]
#[command(name = "snaptext")]
#[command(about = "Pick a photo and copy the text recognized in it")]
struct Args {
    /// Folder the photo picker opens on
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// OCR engine to use
    #[arg(short, long, value_enum)]
    backend: Option<OcrBackend>,

    /// Configuration file to use instead of the default one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    info!("SnapText starting...");

    let mut config = load_or_create_config(args.config.as_deref());

    if let Some(backend) = args.backend {
        config.recognition.backend = backend;
    }
    if let Some(library) = args.library {
        config.library.directory = Some(library);
    }

    let library_dir = resolve_library_dir(&config);
    info!("Photo library: {}", library_dir.display());

    if let Err(e) = ui::run(config, library_dir) {
        tracing::error!("Window error: {}", e);
    }

    info!("SnapText shutdown complete");

    Ok(())
}

/// Load configuration from file, writing the defaults if there is none
fn load_or_create_config(explicit: Option<&Path>) -> AppConfig {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match storage::get_config_dir() {
            Ok(dir) => dir.join("config.toml"),
            Err(e) => {
                warn!("{:#}; using default configuration", e);
                return AppConfig::default();
            }
        },
    };

    if config_path.exists() {
        match config::load_config(&config_path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
            Err(e) => {
                warn!("{:#}; using default configuration", e);
                return AppConfig::default();
            }
        }
    }

    let config = AppConfig::default();
    match config::save_config(&config, &config_path) {
        Ok(()) => info!("Wrote default configuration to {:?}", config_path),
        Err(e) => warn!("{:#}", e),
    }
    config
}

/// Folder the picker starts in
fn resolve_library_dir(config: &AppConfig) -> PathBuf {
    config
        .library
        .directory
        .clone()
        .or_else(storage::default_library_dir)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
