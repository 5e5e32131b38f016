//! Image preview / picker trigger

use egui::{Rounding, Sense, Vec2};

use crate::ui::theme::{color_with_alpha, ThemeColors};

/// Size of the preview frame
pub const PREVIEW_SIZE: Vec2 = Vec2::new(300.0, 200.0);

const PREVIEW_ROUNDING: f32 = 20.0;

/// Render the image preview, or a placeholder when nothing is picked.
///
/// Returns true when the user clicked it to choose a photo.
pub fn render_image_panel(ui: &mut egui::Ui, preview: Option<&egui::TextureHandle>) -> bool {
    let response = match preview {
        Some(texture) => {
            let image = egui::Image::new(texture)
                .max_size(PREVIEW_SIZE)
                .maintain_aspect_ratio(true)
                .rounding(Rounding::same(PREVIEW_ROUNDING))
                .sense(Sense::click());
            ui.add_sized(PREVIEW_SIZE, image)
        }
        None => render_placeholder(ui),
    };

    response
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .on_hover_text("Choose a photo (Ctrl+O)")
        .clicked()
}

fn render_placeholder(ui: &mut egui::Ui) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(PREVIEW_SIZE, Sense::click());

    let fill = if response.hovered() {
        color_with_alpha(ThemeColors::TEXT_SECONDARY, 64)
    } else {
        color_with_alpha(ThemeColors::TEXT_SECONDARY, 51)
    };
    ui.painter()
        .rect_filled(rect, Rounding::same(PREVIEW_ROUNDING), fill);

    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Click to upload an image",
        egui::FontId::proportional(17.0),
        ThemeColors::TEXT_SECONDARY,
    );

    response
}
