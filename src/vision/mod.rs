//! Vision/OCR Layer
//!
//! Hands a picked bitmap to an OCR engine and turns what the engine reports
//! into the text shown to the user. Supports two engines:
//! - Windows OCR API (platform engine, Windows only)
//! - ocrs with locally installed `.rten` models

pub mod frame;
pub mod ocrs_engine;
#[cfg(windows)]
pub mod windows_ocr;
pub mod worker;

use anyhow::Result;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RecognitionSettings;
use crate::picker::Bitmap;

pub use frame::{prepare_frame, RgbaFrame};
pub use ocrs_engine::OcrsEngine;
#[cfg(windows)]
pub use windows_ocr::WindowsOcr;
pub use worker::RecognitionWorker;

/// Shown when the engine ran but reported no text
pub const NO_TEXT_MESSAGE: &str = "No text found in the image.";

/// OCR backend selection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// Windows built-in OCR
    WindowsOcr,
    /// ocrs via RTen models
    Ocrs,
}

impl Default for OcrBackend {
    fn default() -> Self {
        if cfg!(windows) {
            OcrBackend::WindowsOcr
        } else {
            OcrBackend::Ocrs
        }
    }
}

impl OcrBackend {
    pub fn name(&self) -> &'static str {
        match self {
            OcrBackend::WindowsOcr => "Windows OCR",
            OcrBackend::Ocrs => "ocrs",
        }
    }
}

/// Why a recognition cycle produced no text.
///
/// The `Display` output is the exact message shown in the text panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// The bitmap could not be converted into the engine's pixel format
    #[error("Could not process the image.")]
    ImageDecode,
    /// The engine failed while recognizing
    #[error("Error: {0}")]
    Engine(String),
    /// The engine could not be started or handed the image
    #[error("Failed to perform text recognition: {0}")]
    Invocation(String),
}

/// One ranked reading of an observation
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub confidence: f32,
}

/// A text line reported by an engine, with its candidate readings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    pub candidates: Vec<Candidate>,
}

impl Observation {
    /// An observation with a single candidate
    pub fn single(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            candidates: vec![Candidate {
                text: text.into(),
                confidence,
            }],
        }
    }

    /// Highest-confidence candidate; the first reported one wins ties.
    ///
    /// A NaN confidence ranks below every real one.
    pub fn top_candidate(&self) -> Option<&Candidate> {
        let mut best: Option<&Candidate> = None;
        for candidate in &self.candidates {
            match best {
                Some(current) if rank(candidate) <= rank(current) => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}

fn rank(candidate: &Candidate) -> f32 {
    if candidate.confidence.is_nan() {
        f32::NEG_INFINITY
    } else {
        candidate.confidence
    }
}

/// An OCR engine the adapter can drive
pub trait TextRecognizer {
    /// Recognize text lines in the frame, in top-to-bottom order
    fn recognize(&mut self, frame: &RgbaFrame) -> Result<Vec<Observation>, RecognitionError>;

    /// Largest width or height the engine accepts, if it has a limit
    fn max_image_dimension(&self) -> Option<u32> {
        None
    }

    fn name(&self) -> &'static str;
}

/// Builds the engine on first use
pub type EngineFactory = Box<dyn FnMut() -> Result<Box<dyn TextRecognizer>> + Send>;

/// Successfully recognized lines, one per observation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognizedText {
    pub lines: Vec<String>,
}

impl RecognizedText {
    /// Keep the top candidate of each observation, in engine order
    pub fn from_observations(observations: &[Observation]) -> Self {
        Self {
            lines: observations
                .iter()
                .filter_map(|o| o.top_candidate())
                .map(|c| c.text.clone())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined by newlines, or the no-text message
    pub fn display_text(&self) -> String {
        if self.is_empty() {
            NO_TEXT_MESSAGE.to_string()
        } else {
            self.lines.join("\n")
        }
    }
}

/// Text shown for the outcome of a recognition cycle
pub fn display_text(result: &Result<RecognizedText, RecognitionError>) -> String {
    match result {
        Ok(text) => text.display_text(),
        Err(e) => e.to_string(),
    }
}

/// Drives one engine through recognition cycles.
///
/// Lives on the recognition worker; the engine is created lazily there.
pub struct RecognitionAdapter {
    factory: EngineFactory,
    engine: Option<Box<dyn TextRecognizer>>,
    max_image_dimension: u32,
}

impl RecognitionAdapter {
    pub fn new(factory: EngineFactory, max_image_dimension: u32) -> Self {
        Self {
            factory,
            engine: None,
            max_image_dimension,
        }
    }

    /// Run OCR on a bitmap
    pub fn recognize_text(&mut self, bitmap: &Bitmap) -> Result<RecognizedText, RecognitionError> {
        let frame = prepare_frame(bitmap, self.max_image_dimension)?;

        let engine = self.engine()?;
        let frame = match engine.max_image_dimension() {
            Some(limit) => frame.fit_within(limit)?,
            None => frame,
        };

        debug!(
            "{}: recognizing {}x{} frame from {}",
            engine.name(),
            frame.width(),
            frame.height(),
            bitmap.name()
        );

        let observations = engine.recognize(&frame)?;
        let text = RecognizedText::from_observations(&observations);

        debug!(
            "{}: {} observations, {} lines",
            engine.name(),
            observations.len(),
            text.lines.len()
        );

        Ok(text)
    }

    fn engine(&mut self) -> Result<&mut Box<dyn TextRecognizer>, RecognitionError> {
        if self.engine.is_none() {
            let engine = (self.factory)()
                .map_err(|e| RecognitionError::Invocation(format!("{:#}", e)))?;
            info!("OCR engine ready: {}", engine.name());
            self.engine = Some(engine);
        }

        self.engine
            .as_mut()
            .ok_or_else(|| RecognitionError::Invocation("OCR engine unavailable".to_string()))
    }
}

/// Create the engine selected in settings
pub fn create_engine(settings: &RecognitionSettings) -> Result<Box<dyn TextRecognizer>> {
    match settings.backend {
        OcrBackend::WindowsOcr => create_windows_engine(settings),
        OcrBackend::Ocrs => {
            let (detection, recognition) = resolve_model_paths(settings)?;
            Ok(Box::new(OcrsEngine::new(&detection, &recognition)?))
        }
    }
}

#[cfg(windows)]
fn create_windows_engine(settings: &RecognitionSettings) -> Result<Box<dyn TextRecognizer>> {
    Ok(Box::new(WindowsOcr::new(&settings.language)?))
}

#[cfg(not(windows))]
fn create_windows_engine(_settings: &RecognitionSettings) -> Result<Box<dyn TextRecognizer>> {
    anyhow::bail!("Windows OCR is only available on Windows")
}

/// Model paths from settings, or the defaults in the data folder
fn resolve_model_paths(settings: &RecognitionSettings) -> Result<(PathBuf, PathBuf)> {
    let detection = match &settings.detection_model {
        Some(path) => path.clone(),
        None => crate::storage::get_models_dir()?.join("text-detection.rten"),
    };
    let recognition = match &settings.recognition_model {
        Some(path) => path.clone(),
        None => crate::storage::get_models_dir()?.join("text-recognition.rten"),
    };

    for path in [&detection, &recognition] {
        if !path.is_file() {
            anyhow::bail!("ocrs model not found at {}", path.display());
        }
    }

    Ok((detection, recognition))
}
