//! App Shell state and its controller

use anyhow::Result;
use tracing::{debug, info};

use super::messages::{RecognitionJob, RecognitionOutcome};
use crate::clipboard::ClipboardSink;
use crate::picker::{Bitmap, PickOutcome};

/// Text shown before any image has been recognized
pub const PLACEHOLDER_TEXT: &str = "No text extracted yet.";

/// Text shown while recognition of a new image runs
pub const PROCESSING_TEXT: &str = "Recognizing text...";

/// Where the shell is in the pick/recognize cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellPhase {
    /// No image selected yet
    Empty,
    /// The library picker is open
    Picking,
    /// An image and its text are shown
    Displaying,
}

/// The state the render layer reads
#[derive(Debug, Clone)]
pub struct UiState {
    /// Current image, replaced on each pick
    pub image: Option<Bitmap>,
    /// Bumped whenever `image` changes
    pub image_revision: u64,
    /// Recognized text, a placeholder, or an error message
    pub display_text: String,
    /// Whether the library picker is open
    pub picker_visible: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            image: None,
            image_revision: 0,
            display_text: PLACEHOLDER_TEXT.to_string(),
            picker_visible: false,
        }
    }
}

/// Single writer of [`UiState`]; every method runs on the UI thread
#[derive(Debug, Default)]
pub struct AppShell {
    state: UiState,
    next_job_id: u64,
    /// Most recently submitted job still awaiting its outcome
    pending_job: Option<u64>,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn phase(&self) -> ShellPhase {
        if self.state.picker_visible {
            ShellPhase::Picking
        } else if self.state.image.is_some() {
            ShellPhase::Displaying
        } else {
            ShellPhase::Empty
        }
    }

    /// Whether the latest submitted job hasn't answered yet
    pub fn is_recognizing(&self) -> bool {
        self.pending_job.is_some()
    }

    /// Show the picker; returns false if it is already open
    pub fn open_picker(&mut self) -> bool {
        if self.state.picker_visible {
            return false;
        }
        debug!("Picker opened from {:?}", self.phase());
        self.state.picker_visible = true;
        true
    }

    /// Close the picker with its outcome.
    ///
    /// A selection replaces the image and returns the job to submit;
    /// a cancellation leaves image and text untouched.
    pub fn finish_pick(&mut self, outcome: PickOutcome) -> Option<RecognitionJob> {
        self.state.picker_visible = false;

        match outcome {
            PickOutcome::Cancelled => {
                debug!("Picker cancelled");
                None
            }
            PickOutcome::Selected(bitmap) => {
                let (width, height) = bitmap.dimensions();
                info!("Selected {} ({}x{})", bitmap.name(), width, height);

                self.next_job_id += 1;
                let id = self.next_job_id;

                self.state.image = Some(bitmap.clone());
                self.state.image_revision += 1;
                self.state.display_text = PROCESSING_TEXT.to_string();
                self.pending_job = Some(id);

                Some(RecognitionJob { id, bitmap })
            }
        }
    }

    /// Apply a finished job; the last one to arrive wins
    pub fn apply_outcome(&mut self, outcome: RecognitionOutcome) {
        if self.pending_job == Some(outcome.id) {
            self.pending_job = None;
        } else {
            debug!("Outcome for superseded job {} applied", outcome.id);
        }

        match &outcome.result {
            Ok(text) => info!(
                "Job {} recognized {} lines in {:?}",
                outcome.id,
                text.lines.len(),
                outcome.elapsed
            ),
            Err(e) => info!("Job {} failed in {:?}: {:?}", outcome.id, outcome.elapsed, e),
        }

        self.state.display_text = outcome.display_text();
    }

    /// Put the exact display text on the clipboard
    pub fn copy_text(&self, clipboard: &mut dyn ClipboardSink) -> Result<()> {
        clipboard.set_text(&self.state.display_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::tests::{bitmap, FakeEngine};
    use crate::vision::{RecognitionAdapter, RecognitionError, TextRecognizer};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingClipboard {
        contents: Option<String>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    /// Run a job through an adapter synchronously, as the worker would
    fn run_job(engine: FakeEngine, job: &RecognitionJob) -> RecognitionOutcome {
        let mut slot = Some(engine);
        let mut adapter = RecognitionAdapter::new(
            Box::new(move || {
                slot.take()
                    .map(|e| Box::new(e) as Box<dyn TextRecognizer>)
                    .ok_or_else(|| anyhow::anyhow!("engine already taken"))
            }),
            4096,
        );
        RecognitionOutcome {
            id: job.id,
            result: adapter.recognize_text(&job.bitmap),
            elapsed: Duration::ZERO,
        }
    }

    fn select(shell: &mut AppShell, width: u32, height: u32) -> RecognitionJob {
        assert!(shell.open_picker());
        shell
            .finish_pick(PickOutcome::Selected(bitmap(width, height)))
            .expect("selection yields a job")
    }

    #[test]
    fn test_initial_state() {
        let shell = AppShell::new();
        assert_eq!(shell.phase(), ShellPhase::Empty);
        assert_eq!(shell.state().display_text, PLACEHOLDER_TEXT);
        assert!(shell.state().image.is_none());
        assert!(!shell.is_recognizing());
    }

    #[test]
    fn test_open_picker_transitions_to_picking() {
        let mut shell = AppShell::new();
        assert!(shell.open_picker());
        assert_eq!(shell.phase(), ShellPhase::Picking);
        assert!(!shell.open_picker());
    }

    #[test]
    fn test_select_shows_image_and_processing_text() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 8, 8);

        assert_eq!(shell.phase(), ShellPhase::Displaying);
        assert_eq!(shell.state().display_text, PROCESSING_TEXT);
        assert_eq!(shell.state().image_revision, 1);
        assert!(shell.is_recognizing());
        assert_eq!(job.id, 1);
    }

    #[test]
    fn test_scenario_hello_world_then_copy() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 8, 8);

        shell.apply_outcome(run_job(FakeEngine::lines(&["Hello", "World"]), &job));
        assert_eq!(shell.state().display_text, "Hello\nWorld");
        assert!(!shell.is_recognizing());

        let mut clipboard = RecordingClipboard::default();
        shell.copy_text(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("Hello\nWorld"));
    }

    #[test]
    fn test_scenario_no_text() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 8, 8);

        shell.apply_outcome(run_job(FakeEngine::new(Ok(vec![])), &job));
        assert_eq!(shell.state().display_text, "No text found in the image.");
    }

    #[test]
    fn test_scenario_invocation_failure() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 8, 8);

        let engine = FakeEngine::new(Err(RecognitionError::Invocation("timeout".to_string())));
        shell.apply_outcome(run_job(engine, &job));
        assert_eq!(
            shell.state().display_text,
            "Failed to perform text recognition: timeout"
        );
    }

    #[test]
    fn test_scenario_unprocessable_image() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 0, 0);

        let engine = FakeEngine::lines(&["never"]);
        let calls = engine.calls.clone();
        shell.apply_outcome(run_job(engine, &job));

        assert_eq!(shell.state().display_text, "Could not process the image.");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_from_empty_keeps_state() {
        let mut shell = AppShell::new();
        assert!(shell.open_picker());
        assert!(shell.finish_pick(PickOutcome::Cancelled).is_none());

        assert_eq!(shell.phase(), ShellPhase::Empty);
        assert_eq!(shell.state().display_text, PLACEHOLDER_TEXT);
    }

    #[test]
    fn test_cancel_while_displaying_keeps_image_and_text() {
        let mut shell = AppShell::new();
        let job = select(&mut shell, 8, 8);
        shell.apply_outcome(run_job(FakeEngine::lines(&["Receipt"]), &job));

        assert!(shell.open_picker());
        assert!(shell.finish_pick(PickOutcome::Cancelled).is_none());

        assert_eq!(shell.phase(), ShellPhase::Displaying);
        assert_eq!(shell.state().display_text, "Receipt");
        assert_eq!(shell.state().image_revision, 1);
    }

    #[test]
    fn test_last_outcome_wins() {
        let mut shell = AppShell::new();
        let first = select(&mut shell, 8, 8);
        let second = select(&mut shell, 8, 8);
        assert!(second.id > first.id);

        // Newer job answers first, then the stale one lands
        shell.apply_outcome(run_job(FakeEngine::lines(&["second"]), &second));
        assert!(!shell.is_recognizing());
        shell.apply_outcome(run_job(FakeEngine::lines(&["first"]), &first));

        assert_eq!(shell.state().display_text, "first");
    }

    #[test]
    fn test_copy_placeholder_and_error_text_verbatim() {
        let mut shell = AppShell::new();
        let mut clipboard = RecordingClipboard::default();

        shell.copy_text(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some(PLACEHOLDER_TEXT));

        let job = select(&mut shell, 8, 8);
        shell.apply_outcome(RecognitionOutcome::failed(
            job.id,
            RecognitionError::Engine("model crashed".to_string()),
        ));
        shell.copy_text(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("Error: model crashed"));
    }
}
