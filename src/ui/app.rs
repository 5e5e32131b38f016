//! SnapText main window

use anyhow::Result;
use eframe::egui;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::clipboard::SystemClipboard;
use crate::config::AppConfig;
use crate::picker::LibraryBrowser;
use crate::shared::{AppShell, RecognitionOutcome};
use crate::ui::theme::{self, ThemeColors};
use crate::ui::views::{render_image_panel, render_status_line, render_text_panel};
use crate::vision::{create_engine, OcrBackend, RecognitionWorker};

/// The main application
pub struct SnapTextApp {
    /// Owner of everything the window shows
    shell: AppShell,
    /// Recognition thread
    worker: RecognitionWorker,
    /// Open library browser, while picking
    browser: Option<LibraryBrowser>,
    /// Folder the next browser opens on
    library_dir: PathBuf,
    clipboard: SystemClipboard,
    /// Preview texture and the image revision it was built from
    preview: Option<(u64, egui::TextureHandle)>,
    /// Whether theme has been applied
    theme_applied: bool,
    backend: OcrBackend,
}

impl SnapTextApp {
    /// Create the app and start its recognition worker
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        library_dir: PathBuf,
    ) -> Result<Self> {
        let settings = config.recognition.clone();
        let backend = settings.backend;

        let ctx = cc.egui_ctx.clone();
        let worker = RecognitionWorker::spawn(
            Box::new(move || create_engine(&settings)),
            config.recognition.max_image_dimension,
            move || ctx.request_repaint(),
        )?;

        info!("Using {} backend", backend.name());

        Ok(Self {
            shell: AppShell::new(),
            worker,
            browser: None,
            library_dir,
            clipboard: SystemClipboard::new(),
            preview: None,
            theme_applied: false,
            backend,
        })
    }

    /// Create eframe options for the main window
    pub fn options(config: &AppConfig) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_min_inner_size([360.0, 480.0])
                .with_title("SnapText"),
            ..Default::default()
        }
    }

    fn open_picker(&mut self) {
        if self.shell.open_picker() {
            self.browser = Some(LibraryBrowser::open(self.library_dir.clone()));
        }
    }

    fn copy_text(&mut self, ctx: &egui::Context) {
        if let Err(e) = self.shell.copy_text(&mut self.clipboard) {
            warn!("{:#}, using egui clipboard", e);
            ctx.copy_text(self.shell.state().display_text.clone());
        }
    }

    fn process_outcomes(&mut self) {
        while let Some(outcome) = self.worker.try_recv() {
            self.shell.apply_outcome(outcome);
        }
    }

    fn process_shortcuts(&mut self, ctx: &egui::Context) {
        let open = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::O));
        let copy = ctx.input_mut(|i| {
            i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::C)
        });

        if open {
            self.open_picker();
        }
        if copy {
            self.copy_text(ctx);
        }
    }

    fn process_picker(&mut self, ctx: &egui::Context) {
        if !self.shell.state().picker_visible {
            return;
        }

        let library_dir = &self.library_dir;
        let browser = self
            .browser
            .get_or_insert_with(|| LibraryBrowser::open(library_dir.clone()));

        let Some(outcome) = browser.show(ctx) else {
            return;
        };

        self.library_dir = browser.directory().to_path_buf();
        self.browser = None;

        if let Some(job) = self.shell.finish_pick(outcome) {
            let id = job.id;
            if let Err(e) = self.worker.submit(job) {
                warn!("{}", e);
                self.shell.apply_outcome(RecognitionOutcome::failed(id, e));
            }
        }
    }

    /// Rebuild the preview texture when the image changed
    fn sync_preview(&mut self, ctx: &egui::Context) {
        let state = self.shell.state();
        let revision = state.image_revision;

        if self.preview.as_ref().map(|(rev, _)| *rev) == Some(revision) {
            return;
        }

        self.preview = state.image.as_ref().map(|bitmap| {
            let thumbnail = bitmap.image().thumbnail(600, 400).to_rgba8();
            let size = [thumbnail.width() as usize, thumbnail.height() as usize];
            let image = egui::ColorImage::from_rgba_unmultiplied(size, thumbnail.as_raw());
            let texture = ctx.load_texture("preview", image, egui::TextureOptions::LINEAR);
            (revision, texture)
        });
    }
}

impl eframe::App for SnapTextApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.process_outcomes();
        self.process_shortcuts(ctx);
        self.sync_preview(ctx);

        let mut open_clicked = false;
        let mut copy_clicked = false;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(ThemeColors::BG_DARK)
                    .inner_margin(20.0),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let texture = self.preview.as_ref().map(|(_, texture)| texture);
                    open_clicked = render_image_panel(ui, texture);
                });

                ui.add_space(16.0);

                let text_height = ui.available_height() - 40.0;
                copy_clicked = render_text_panel(ui, &self.shell.state().display_text, text_height);

                ui.add_space(8.0);
                render_status_line(ui, self.backend.name(), self.shell.is_recognizing());
            });

        if open_clicked {
            self.open_picker();
        }
        if copy_clicked {
            self.copy_text(ctx);
        }

        self.process_picker(ctx);
    }
}

/// Run the SnapText window
pub fn run(config: AppConfig, library_dir: PathBuf) -> Result<(), eframe::Error> {
    eframe::run_native(
        "SnapText",
        SnapTextApp::options(&config),
        Box::new(move |cc| Ok(Box::new(SnapTextApp::new(cc, &config, library_dir)?))),
    )
}
