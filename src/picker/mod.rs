//! Image Source
//!
//! Lets the user choose a photo from their picture library through an
//! in-window modal browser. A request resolves to either a decoded bitmap
//! or a cancellation.

pub mod browser;

pub use browser::LibraryBrowser;

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// File extensions shown in the library
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

/// A decoded picture chosen by the user
#[derive(Debug, Clone)]
pub struct Bitmap {
    name: String,
    image: Arc<DynamicImage>,
}

impl Bitmap {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            image: Arc::new(image),
        }
    }

    /// File name the bitmap was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Get dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// How an image request resolved
#[derive(Debug, Clone)]
pub enum PickOutcome {
    /// The user chose an image
    Selected(Bitmap),
    /// The user closed the picker without choosing
    Cancelled,
}

/// Failure to turn a library file into a bitmap
#[derive(Debug, Error)]
pub enum PickError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An image file in the library
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub name: String,
    /// File size in bytes
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Contents of one library folder
#[derive(Debug, Clone, Default)]
pub struct LibraryListing {
    /// Sub-folders, sorted by name
    pub folders: Vec<PathBuf>,
    /// Image files, newest first
    pub images: Vec<LibraryEntry>,
}

/// Whether the path has one of the supported image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List the images and sub-folders of a library folder.
///
/// Hidden entries (dot-files) are skipped.
pub fn scan_library(dir: &Path) -> Result<LibraryListing> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to open folder {}", dir.display()))?;

    let mut listing = LibraryListing::default();

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        if metadata.is_dir() {
            listing.folders.push(path);
        } else if metadata.is_file() && is_supported_image(&path) {
            listing.images.push(LibraryEntry {
                path,
                name,
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }
    }

    listing.folders.sort();
    listing
        .images
        .sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));

    Ok(listing)
}

/// Read and decode an image file
pub fn load_bitmap(path: &Path) -> Result<Bitmap, PickError> {
    let bytes = std::fs::read(path).map_err(|source| PickError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| PickError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Bitmap::new(name, image))
}

/// Human-readable file size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("a.png")));
        assert!(is_supported_image(Path::new("b.JPG")));
        assert!(is_supported_image(Path::new("dir/c.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_library_lists_images_and_folders() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "receipt.png", 4, 4);
        write_png(dir.path(), "sign.png", 2, 2);
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join(".hidden.png"), "x").unwrap();
        std::fs::create_dir(dir.path().join("Holidays")).unwrap();

        let listing = scan_library(dir.path()).unwrap();

        let mut names: Vec<_> = listing.images.iter().map(|e| e.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["receipt.png", "sign.png"]);
        assert_eq!(listing.folders, vec![dir.path().join("Holidays")]);
        assert!(listing.images.iter().all(|e| e.size > 0));
    }

    #[test]
    fn test_scan_library_missing_folder() {
        assert!(scan_library(Path::new("/nonexistent/pictures")).is_err());
    }

    #[test]
    fn test_load_bitmap_decodes_image() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "photo.png", 6, 3);

        let bitmap = load_bitmap(&path).unwrap();
        assert_eq!(bitmap.name(), "photo.png");
        assert_eq!(bitmap.dimensions(), (6, 3));
    }

    #[test]
    fn test_load_bitmap_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(load_bitmap(&path), Err(PickError::Decode { .. })));
        assert!(matches!(
            load_bitmap(&dir.path().join("missing.png")),
            Err(PickError::Io { .. })
        ));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
