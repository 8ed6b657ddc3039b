//! Local OCR via libtesseract (feature `ocr`).

use async_trait::async_trait;
use tesseract::Tesseract;

use super::preprocess::PreparedImage;
use super::tsv::parse_tesseract_tsv;
use super::{OcrEngine, OcrError};
use crate::models::TextRegion;

pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Fail at startup rather than on the first upload if the language data is missing
    pub fn check_installation(&self) -> Result<(), OcrError> {
        Tesseract::new(None, Some(&self.language))
            .map(|_| ())
            .map_err(|e| OcrError::Unavailable(format!("Tesseract could not load '{}': {}", self.language, e)))
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn engine_id(&self) -> &'static str {
        "tesseract"
    }

    async fn read_text(&self, image: &PreparedImage) -> Result<Vec<TextRegion>, OcrError> {
        let language = self.language.clone();
        let png = image.png.clone();

        // libtesseract is blocking and not Send across awaits
        let tsv = tokio::task::spawn_blocking(move || -> Result<String, OcrError> {
            let mut tesseract = Tesseract::new(None, Some(&language))
                .map_err(|e| OcrError::Unavailable(format!("Tesseract initialization failed: {}", e)))?
                .set_image_from_mem(&png)
                .map_err(|e| OcrError::Engine(format!("Tesseract rejected image: {}", e)))?
                .recognize()
                .map_err(|e| OcrError::Engine(format!("Tesseract recognition failed: {}", e)))?;

            tesseract
                .get_tsv_text(0)
                .map_err(|e| OcrError::Engine(format!("Failed to extract text: {}", e)))
        })
        .await
        .map_err(|e| OcrError::Engine(format!("OCR task failed: {}", e)))??;

        Ok(parse_tesseract_tsv(&tsv))
    }
}
