//! Modal photo library browser

use egui::{Color32, RichText, Vec2};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{format_size, load_bitmap, scan_library, LibraryListing, PickOutcome};
use crate::ui::theme::ThemeColors;

/// What the user did inside the browser this frame
enum BrowserAction {
    Navigate(PathBuf),
    Refresh,
    Open(usize),
    Cancel,
}

/// An open library browser; one per image request
pub struct LibraryBrowser {
    directory: PathBuf,
    path_input: String,
    listing: LibraryListing,
    selected: Option<usize>,
    error: Option<String>,
}

impl LibraryBrowser {
    /// Open the browser on a folder
    pub fn open(directory: PathBuf) -> Self {
        info!("Opening photo library at {}", directory.display());
        let mut browser = Self {
            path_input: directory.display().to_string(),
            directory,
            listing: LibraryListing::default(),
            selected: None,
            error: None,
        };
        browser.refresh();
        browser
    }

    /// Folder currently shown
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn refresh(&mut self) {
        self.selected = None;
        match scan_library(&self.directory) {
            Ok(listing) => {
                debug!(
                    "Library {}: {} images, {} folders",
                    self.directory.display(),
                    listing.images.len(),
                    listing.folders.len()
                );
                self.listing = listing;
                self.error = None;
            }
            Err(e) => {
                warn!("{:#}", e);
                self.listing = LibraryListing::default();
                self.error = Some(format!("{:#}", e));
            }
        }
    }

    fn navigate(&mut self, directory: PathBuf) {
        self.path_input = directory.display().to_string();
        self.directory = directory;
        self.refresh();
    }

    /// Draw the browser; returns the outcome once the user picks or cancels
    pub fn show(&mut self, ctx: &egui::Context) -> Option<PickOutcome> {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            return Some(PickOutcome::Cancelled);
        }

        draw_backdrop(ctx);

        let mut window_open = true;
        let mut action = None;

        egui::Window::new("Photo Library")
            .open(&mut window_open)
            .collapsible(false)
            .resizable(true)
            .order(egui::Order::Foreground)
            .default_size([380.0, 440.0])
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                action = self.render_contents(ui);
            });

        if !window_open {
            return Some(PickOutcome::Cancelled);
        }

        self.apply(action?)
    }

    fn apply(&mut self, action: BrowserAction) -> Option<PickOutcome> {
        match action {
            BrowserAction::Cancel => Some(PickOutcome::Cancelled),
            BrowserAction::Refresh => {
                self.refresh();
                None
            }
            BrowserAction::Navigate(directory) => {
                self.navigate(directory);
                None
            }
            BrowserAction::Open(index) => {
                let entry = self.listing.images.get(index)?;
                match load_bitmap(&entry.path) {
                    Ok(bitmap) => Some(PickOutcome::Selected(bitmap)),
                    Err(e) => {
                        // Keep the browser open so another photo can be chosen
                        warn!("{}", e);
                        self.error = Some(e.to_string());
                        None
                    }
                }
            }
        }
    }

    fn render_contents(&mut self, ui: &mut egui::Ui) -> Option<BrowserAction> {
        let mut action = None;

        // Folder path row
        ui.horizontal(|ui| {
            let up_enabled = self.directory.parent().is_some();
            if ui.add_enabled(up_enabled, egui::Button::new("Up")).clicked() {
                if let Some(parent) = self.directory.parent() {
                    action = Some(BrowserAction::Navigate(parent.to_path_buf()));
                }
            }

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .desired_width(ui.available_width() - 110.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button("Go").clicked() || submitted {
                action = Some(BrowserAction::Navigate(PathBuf::from(self.path_input.trim())));
            }
            if ui.button("Refresh").clicked() {
                action = Some(BrowserAction::Refresh);
            }
        });

        ui.separator();

        if let Some(ref error) = self.error {
            ui.label(RichText::new(error).color(ThemeColors::ACCENT_ERROR));
            ui.add_space(4.0);
        }

        let list_height = (ui.available_height() - 48.0).max(120.0);
        egui::ScrollArea::vertical()
            .max_height(list_height)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for folder in &self.listing.folders {
                    let name = folder
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let label =
                        RichText::new(format!("[{}]", name)).color(ThemeColors::ACCENT_PRIMARY);
                    if ui.selectable_label(false, label).clicked() {
                        action = Some(BrowserAction::Navigate(folder.clone()));
                    }
                }

                if self.listing.images.is_empty() {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("No photos in this folder")
                            .italics()
                            .color(Color32::GRAY),
                    );
                }

                for (idx, entry) in self.listing.images.iter().enumerate() {
                    let is_selected = self.selected == Some(idx);
                    let response = ui
                        .horizontal(|ui| {
                            let response = ui.selectable_label(is_selected, entry.name.as_str());
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(
                                    RichText::new(format_size(entry.size))
                                        .small()
                                        .color(ThemeColors::TEXT_MUTED),
                                );
                            });
                            response
                        })
                        .inner;

                    if response.double_clicked() {
                        action = Some(BrowserAction::Open(idx));
                    } else if response.clicked() {
                        self.selected = Some(idx);
                    }
                }
            });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                action = Some(BrowserAction::Cancel);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(idx) = self.selected {
                    if ui.button(RichText::new("Open").strong()).clicked() {
                        action = Some(BrowserAction::Open(idx));
                    }
                } else {
                    ui.add_enabled(false, egui::Button::new("Open"));
                }
            });
        });

        action
    }
}

/// Dim the main window and swallow its clicks while the browser is open
fn draw_backdrop(ctx: &egui::Context) {
    let screen = ctx.screen_rect();
    egui::Area::new(egui::Id::new("library_backdrop"))
        .order(egui::Order::Middle)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            ui.allocate_response(screen.size(), egui::Sense::click());
            ui.painter().rect_filled(screen, 0.0, Color32::from_black_alpha(140));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::TempDir;

    fn key_event(key: egui::Key) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Run one headless frame with the given input events
    fn run_frame(
        ctx: &egui::Context,
        browser: &mut LibraryBrowser,
        events: Vec<egui::Event>,
    ) -> Option<PickOutcome> {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let mut outcome = None;
        let _ = ctx.run(input, |ctx| {
            outcome = browser.show(ctx);
        });
        outcome
    }

    #[test]
    fn test_idle_frame_keeps_browser_open() {
        let dir = TempDir::new().unwrap();
        let ctx = egui::Context::default();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());

        assert!(run_frame(&ctx, &mut browser, Vec::new()).is_none());
        assert!(browser.error.is_none());
    }

    #[test]
    fn test_escape_cancels() {
        let dir = TempDir::new().unwrap();
        let ctx = egui::Context::default();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());

        assert!(run_frame(&ctx, &mut browser, Vec::new()).is_none());
        let outcome = run_frame(&ctx, &mut browser, vec![key_event(egui::Key::Escape)]);
        assert!(matches!(outcome, Some(PickOutcome::Cancelled)));
    }

    #[test]
    fn test_cancel_action_resolves_cancelled() {
        let dir = TempDir::new().unwrap();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());

        assert!(matches!(
            browser.apply(BrowserAction::Cancel),
            Some(PickOutcome::Cancelled)
        ));
    }

    #[test]
    fn test_open_selects_decoded_photo() {
        let dir = TempDir::new().unwrap();
        RgbaImage::new(5, 4).save(dir.path().join("note.png")).unwrap();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());

        match browser.apply(BrowserAction::Open(0)) {
            Some(PickOutcome::Selected(bitmap)) => {
                assert_eq!(bitmap.name(), "note.png");
                assert_eq!(bitmap.dimensions(), (5, 4));
            }
            _ => panic!("expected a selected bitmap"),
        }
    }

    #[test]
    fn test_corrupt_photo_keeps_browser_open_with_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());
        assert_eq!(browser.listing.images.len(), 1);

        assert!(browser.apply(BrowserAction::Open(0)).is_none());
        assert!(browser.error.is_some());
    }

    #[test]
    fn test_navigate_updates_folder() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("Receipts");
        std::fs::create_dir(&nested).unwrap();
        let mut browser = LibraryBrowser::open(dir.path().to_path_buf());

        assert!(browser.apply(BrowserAction::Navigate(nested.clone())).is_none());
        assert_eq!(browser.directory(), nested.as_path());
        assert_eq!(browser.path_input, nested.display().to_string());
    }
}
