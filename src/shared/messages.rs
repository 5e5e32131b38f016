//! Message types exchanged between the UI thread and the recognition worker

use std::time::Duration;

use crate::picker::Bitmap;
use crate::vision::{display_text, RecognitionError, RecognizedText};

/// Request to recognize text in a picked bitmap
#[derive(Debug, Clone)]
pub struct RecognitionJob {
    /// Increases with every selection
    pub id: u64,
    pub bitmap: Bitmap,
}

/// Result of one recognition job, sent back to the UI thread
#[derive(Debug, Clone)]
pub struct RecognitionOutcome {
    /// Id of the job this answers
    pub id: u64,
    pub result: Result<RecognizedText, RecognitionError>,
    /// Time spent in the adapter
    pub elapsed: Duration,
}

impl RecognitionOutcome {
    /// An outcome for a job that never reached the worker
    pub fn failed(id: u64, error: RecognitionError) -> Self {
        Self {
            id,
            result: Err(error),
            elapsed: Duration::ZERO,
        }
    }

    /// Text to show for this outcome
    pub fn display_text(&self) -> String {
        display_text(&self.result)
    }
}
