pub mod factory;
pub mod preprocess;
pub mod remote;
#[cfg(feature = "ocr")]
pub mod tesseract;
pub mod tsv;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::TextRegion;
use crate::utils::text::normalize_region_text;
use preprocess::{prepare_image, PreparedImage};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("OCR service unavailable: {0}")]
    Unavailable(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// An OCR engine: preprocessed image in, text lines with boxes out.
///
/// Regions are returned in reading order. An empty list is a valid answer
/// for an image with no legible text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs
    fn engine_id(&self) -> &'static str;

    async fn read_text(&self, image: &PreparedImage) -> Result<Vec<TextRegion>, OcrError>;
}

/// Settings applied around whichever engine is configured
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Regions at or below this confidence are discarded
    pub confidence_threshold: f32,
    pub deskew: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            deskew: true,
        }
    }
}

/// Runs preprocessing, the OCR engine and region cleanup for one image
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    config: OcrConfig,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new_with_config(engine, OcrConfig::default())
    }

    pub fn new_with_config(engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine_id(&self) -> &'static str {
        self.engine.engine_id()
    }

    /// Turn raw upload bytes into cleaned text regions in reading order
    pub async fn extract_regions(&self, image_bytes: &[u8]) -> Result<Vec<TextRegion>, OcrError> {
        let start = Instant::now();
        let bytes = image_bytes.to_vec();
        let deskew = self.config.deskew;

        let prepared = tokio::task::spawn_blocking(move || prepare_image(&bytes, deskew))
            .await
            .map_err(|e| OcrError::Engine(format!("Image preprocessing task failed: {}", e)))??;

        debug!(
            "Prepared {}x{} image for {} (skew corrected by {:.2}°)",
            prepared.width,
            prepared.height,
            self.engine.engine_id(),
            prepared.skew_angle
        );

        let raw_regions = self.engine.read_text(&prepared).await?;
        let raw_count = raw_regions.len();
        let regions = clean_regions(raw_regions, self.config.confidence_threshold);

        info!(
            "OCR ({}) kept {} of {} regions in {}ms",
            self.engine.engine_id(),
            regions.len(),
            raw_count,
            start.elapsed().as_millis()
        );

        Ok(regions)
    }
}

/// Drop low-confidence regions and normalize the text of the rest.
///
/// Regions left with no letters after normalization are dropped as well.
pub fn clean_regions(regions: Vec<TextRegion>, confidence_threshold: f32) -> Vec<TextRegion> {
    regions
        .into_iter()
        .filter(|region| region.confidence > confidence_threshold)
        .filter_map(|region| {
            let text = normalize_region_text(&region.text);
            if text.is_empty() {
                None
            } else {
                Some(TextRegion { text, ..region })
            }
        })
        .collect()
}
