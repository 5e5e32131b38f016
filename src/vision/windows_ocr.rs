//! Windows OCR API backend
//!
//! Uses the built-in Windows OCR (Media.Ocr). Each recognized line becomes one
//! observation with a single candidate.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use windows::{
    core::HSTRING,
    Globalization::Language,
    Graphics::Imaging::{BitmapPixelFormat, SoftwareBitmap},
    Media::Ocr::{OcrEngine as WinOcrEngine, OcrResult as WinOcrResult},
    Storage::Streams::{DataReader, DataWriter, InMemoryRandomAccessStream},
};

use super::{Observation, RecognitionError, RgbaFrame, TextRecognizer};

/// Windows OCR doesn't report confidence
const LINE_CONFIDENCE: f32 = 1.0;

/// Windows OCR engine wrapper
pub struct WindowsOcr {
    engine: WinOcrEngine,
    language: String,
    max_dimension: Option<u32>,
}

impl WindowsOcr {
    /// Create a new Windows OCR engine with the specified language
    pub fn new(language_tag: &str) -> Result<Self> {
        info!("Initializing Windows OCR engine with language: {}", language_tag);

        let language = Language::CreateLanguage(&HSTRING::from(language_tag))
            .context("Failed to create language")?;

        let (engine, language) = if WinOcrEngine::IsLanguageSupported(&language)
            .context("Failed to check language support")?
        {
            let engine = WinOcrEngine::TryCreateFromLanguage(&language)
                .context("Failed to create OCR engine for language")?;
            (engine, language_tag.to_string())
        } else {
            warn!(
                "Language '{}' not supported, falling back to user profile languages",
                language_tag
            );
            let engine = WinOcrEngine::TryCreateFromUserProfileLanguages()
                .context("Failed to create OCR engine from user profile")?;
            let tag = engine
                .RecognizerLanguage()
                .and_then(|l| l.LanguageTag())
                .context("Failed to get recognizer language")?
                .to_string();
            (engine, tag)
        };

        let max_dimension = WinOcrEngine::MaxImageDimension().ok();

        info!(
            "Windows OCR initialized with language: {} (max dimension {:?})",
            language, max_dimension
        );

        Ok(Self {
            engine,
            language,
            max_dimension,
        })
    }
}

impl TextRecognizer for WindowsOcr {
    fn recognize(&mut self, frame: &RgbaFrame) -> Result<Vec<Observation>, RecognitionError> {
        let (width, height) = frame.dimensions();
        debug!("Windows OCR ({}): processing {}x{} frame", self.language, width, height);

        let bgra = rgba_to_bgra(frame.as_raw());
        let bitmap = create_software_bitmap(&bgra, width, height)
            .map_err(|e| RecognitionError::Invocation(format!("{:#}", e)))?;

        let operation = self
            .engine
            .RecognizeAsync(&bitmap)
            .map_err(|e| RecognitionError::Invocation(e.message().to_string()))?;
        let result = operation
            .get()
            .map_err(|e| RecognitionError::Engine(e.message().to_string()))?;

        extract_lines(&result).map_err(|e| RecognitionError::Engine(format!("{:#}", e)))
    }

    fn max_image_dimension(&self) -> Option<u32> {
        self.max_dimension
    }

    fn name(&self) -> &'static str {
        "Windows OCR"
    }
}

/// Convert RGBA to BGRA (Windows expects BGRA)
fn rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
    let mut bgra = rgba.to_vec();
    for chunk in bgra.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
    bgra
}

/// Create a SoftwareBitmap from BGRA data using CopyFromBuffer
fn create_software_bitmap(bgra_data: &[u8], width: u32, height: u32) -> Result<SoftwareBitmap> {
    let stream = InMemoryRandomAccessStream::new().context("Failed to create in-memory stream")?;

    let writer = DataWriter::CreateDataWriter(&stream).context("Failed to create data writer")?;
    writer.WriteBytes(bgra_data).context("Failed to write pixel data")?;
    writer
        .StoreAsync()
        .context("Failed to start store operation")?
        .get()
        .context("Failed to store data")?;
    writer
        .FlushAsync()
        .context("Failed to start flush operation")?
        .get()
        .context("Failed to flush data")?;

    let bitmap = SoftwareBitmap::Create(BitmapPixelFormat::Bgra8, width as i32, height as i32)
        .context("Failed to create SoftwareBitmap")?;

    let input_stream = stream.GetInputStreamAt(0).context("Failed to get input stream")?;
    let reader =
        DataReader::CreateDataReader(&input_stream).context("Failed to create data reader")?;
    reader
        .LoadAsync(bgra_data.len() as u32)
        .context("Failed to start load operation")?
        .get()
        .context("Failed to load data")?;
    let buffer = reader
        .ReadBuffer(bgra_data.len() as u32)
        .context("Failed to read buffer")?;

    bitmap
        .CopyFromBuffer(&buffer)
        .context("Failed to copy buffer to bitmap")?;

    Ok(bitmap)
}

/// One observation per recognized line, in reading order
fn extract_lines(ocr_result: &WinOcrResult) -> Result<Vec<Observation>> {
    let lines = ocr_result.Lines().context("Failed to get OCR lines")?;

    let mut observations = Vec::new();
    for i in 0..lines.Size().context("Failed to get lines size")? {
        let line = lines.GetAt(i).context("Failed to get line")?;
        let text = line.Text().context("Failed to get line text")?.to_string();
        observations.push(Observation::single(text, LINE_CONFIDENCE));
    }

    Ok(observations)
}
