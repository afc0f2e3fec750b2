use super::types::{OcrEngine, OcrPageResult, OcrToken};
use super::ExtractionError;

/// Tesseract-backed local OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    tessdata_dir: Option<std::path::PathBuf>,
    lang: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    /// Use the system tessdata location and English.
    pub fn new() -> Self {
        Self {
            tessdata_dir: None,
            lang: "eng".to_string(),
        }
    }

    /// Initialize with an explicit tessdata directory.
    pub fn with_tessdata(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::OcrInit(format!(
                "eng.traineddata not found at {}",
                tessdata_dir.display()
            )));
        }
        Ok(Self {
            tessdata_dir: Some(tessdata_dir.to_path_buf()),
            lang: "eng".to_string(),
        })
    }

    /// Set language(s) for OCR (e.g. "eng", "eng+fra").
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }
}

#[cfg(feature = "ocr")]
impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        // The cloud path sends originals; only the local engine needs the
        // upscale/denoise/contrast conditioning.
        let prepared = super::preprocess::prepare_for_ocr(image_bytes)?;

        let datapath = match &self.tessdata_dir {
            Some(dir) => Some(dir.to_str().ok_or_else(|| {
                ExtractionError::OcrInit("Invalid tessdata path".to_string())
            })?),
            None => None,
        };

        let tess = tesseract::Tesseract::new(datapath, Some(self.lang.as_str()))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(&prepared)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        // Per-token confidence via TSV output. Columns:
        // level page_num block_num par_num line_num word_num left top width height conf text
        // Level 5 rows are words; conf is 0-100 (-1 for unscored).
        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        Ok(OcrPageResult {
            tokens: parse_tsv_tokens(&tsv),
        })
    }
}

/// Fallback engine used when the crate is built without `ocr`: every call
/// fails, which the arbiter downgrades to an empty zero-confidence result.
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        Err(ExtractionError::OcrInit(
            "built without the `ocr` feature; no local engine available".to_string(),
        ))
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    tokens: Vec<OcrToken>,
    fail: bool,
}

impl MockOcrEngine {
    /// Build from (text, confidence-on-0-100-scale) pairs.
    pub fn from_tokens(tokens: &[(&str, f32)]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(text, confidence)| OcrToken {
                    text: text.to_string(),
                    confidence: *confidence,
                })
                .collect(),
            fail: false,
        }
    }

    /// An engine that recognizes nothing.
    pub fn empty() -> Self {
        Self::from_tokens(&[])
    }

    /// An engine that always errors.
    pub fn failing() -> Self {
        Self {
            tokens: Vec::new(),
            fail: true,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::OcrProcessing("mock failure".into()));
        }
        Ok(OcrPageResult {
            tokens: self.tokens.clone(),
        })
    }
}

/// Parse Tesseract TSV output into raw tokens on the engine's 0–100 scale.
/// Unscored words (conf -1) are kept at 0.0 so downstream filtering drops
/// them uniformly with other low-confidence tokens.
fn parse_tsv_tokens(tsv: &str) -> Vec<OcrToken> {
    let mut tokens = Vec::new();

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // Level 5 = word
        if fields[0].parse::<i32>() != Ok(5) {
            continue;
        }

        let conf: f32 = match fields[10].parse::<i32>() {
            Ok(c) => c.max(0) as f32,
            Err(_) => continue,
        };

        let word = fields[11].trim();
        if word.is_empty() {
            continue;
        }

        tokens.push(OcrToken {
            text: word.to_string(),
            confidence: conf,
        });
    }

    tokens
}
