//! Extracted text board with the copy action

use egui::{RichText, Rounding};

use crate::ui::theme::{color_with_alpha, ThemeColors};

/// Render the extracted text and its "Copy Text" button.
///
/// Returns true when the copy button was clicked.
pub fn render_text_panel(ui: &mut egui::Ui, text: &str, max_height: f32) -> bool {
    let mut copy_clicked = false;

    ui.label(RichText::new("Extracted Text:").heading().strong());
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .max_height(max_height.max(80.0))
        .auto_shrink([false, true])
        .show(ui, |ui| {
            egui::Frame::none()
                .fill(color_with_alpha(ThemeColors::TEXT_SECONDARY, 51))
                .rounding(Rounding::same(8.0))
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());

                    ui.horizontal(|ui| {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let button = egui::Button::new(
                                RichText::new("Copy Text")
                                    .small()
                                    .color(ThemeColors::TEXT_PRIMARY),
                            )
                            .frame(false);
                            if ui.add(button).on_hover_text("Copy to clipboard").clicked() {
                                copy_clicked = true;
                            }
                        });
                    });

                    ui.add(
                        egui::Label::new(RichText::new(text).color(ThemeColors::TEXT_PRIMARY))
                            .selectable(true),
                    );
                });
        });

    copy_clicked
}

/// One-line status under the text board
pub fn render_status_line(ui: &mut egui::Ui, backend: &str, recognizing: bool) {
    ui.horizontal(|ui| {
        if recognizing {
            ui.spinner();
            ui.label(
                RichText::new("Recognizing...")
                    .small()
                    .color(ThemeColors::ACCENT_PRIMARY),
            );
        } else {
            ui.label(
                RichText::new("Ready")
                    .small()
                    .color(ThemeColors::ACCENT_SUCCESS),
            );
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("Engine: {}", backend))
                    .small()
                    .color(ThemeColors::TEXT_MUTED),
            );
        });
    });
}
