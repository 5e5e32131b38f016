//! Views of the main window

pub mod image_panel;
pub mod text_panel;

pub use image_panel::render_image_panel;
pub use text_panel::{render_status_line, render_text_panel};
