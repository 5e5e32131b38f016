//! Main window, its views and theme

pub mod app;
pub mod theme;
pub mod views;

pub use app::run;
