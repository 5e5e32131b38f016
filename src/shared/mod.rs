//! Shared state and messaging between the UI and the recognition worker
//!
//! The UI state record is owned by the App Shell controller on the UI thread;
//! the worker only talks to it through messages.

pub mod state;
pub mod messages;

pub use state::AppShell;
pub use messages::{RecognitionJob, RecognitionOutcome};
