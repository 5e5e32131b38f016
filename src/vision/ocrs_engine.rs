//! ocrs backend
//!
//! Pure-Rust OCR using the ocrs detection and recognition models, loaded
//! from local `.rten` files.

use anyhow::{Context, Result};
use ocrs::{ImageSource, OcrEngine as RawOcrsEngine, OcrEngineParams};
use rten::Model;
use std::path::Path;
use tracing::info;

use super::{Observation, RecognitionError, RgbaFrame, TextRecognizer};

/// ocrs reports no per-line confidence
const LINE_CONFIDENCE: f32 = 1.0;

/// OCR engine wrapper around ocrs
pub struct OcrsEngine {
    engine: RawOcrsEngine,
}

impl OcrsEngine {
    /// Load the detection and recognition models
    pub fn new(detection_model: &Path, recognition_model: &Path) -> Result<Self> {
        info!(
            "Loading ocrs models from {} and {}",
            detection_model.display(),
            recognition_model.display()
        );

        let detection = Model::load_file(detection_model)
            .with_context(|| format!("Failed to load {}", detection_model.display()))?;
        let recognition = Model::load_file(recognition_model)
            .with_context(|| format!("Failed to load {}", recognition_model.display()))?;

        let engine = RawOcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection),
            recognition_model: Some(recognition),
            ..Default::default()
        })
        .context("Failed to create ocrs engine")?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsEngine {
    fn recognize(&mut self, frame: &RgbaFrame) -> Result<Vec<Observation>, RecognitionError> {
        let source = ImageSource::from_bytes(frame.as_raw(), frame.dimensions())
            .map_err(|e| RecognitionError::Invocation(e.to_string()))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| RecognitionError::Invocation(e.to_string()))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| RecognitionError::Engine(e.to_string()))?;
        let line_rects = self.engine.find_text_lines(&input, &words);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| RecognitionError::Engine(e.to_string()))?;

        Ok(lines
            .into_iter()
            .flatten()
            .map(|line| Observation::single(line.to_string(), LINE_CONFIDENCE))
            .collect())
    }

    fn name(&self) -> &'static str {
        "ocrs"
    }
}
