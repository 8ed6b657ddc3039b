//! Factory for creating the OCR engine based on configuration

use anyhow::{anyhow, Result};
use reqwest::Client;
use std::sync::Arc;

use super::remote::RemoteOcrEngine;
use super::OcrEngine;
use crate::config::{Config, OcrBackendKind};

/// Create the configured OCR engine
pub fn create_ocr_engine(config: &Config, client: Client) -> Result<Arc<dyn OcrEngine>> {
    match config.ocr_backend {
        OcrBackendKind::Remote => {
            let endpoint = config
                .ocr_service_url
                .clone()
                .ok_or_else(|| anyhow!("OCR_SERVICE_URL is required when OCR_BACKEND=remote"))?;
            tracing::info!("Using remote OCR service at {}", endpoint);
            Ok(Arc::new(RemoteOcrEngine::new(client, endpoint)))
        }
        #[cfg(feature = "ocr")]
        OcrBackendKind::Tesseract => {
            let engine = super::tesseract::TesseractEngine::new(config.ocr_language.clone());
            engine.check_installation()?;
            tracing::info!("Using local Tesseract OCR ({})", config.ocr_language);
            Ok(Arc::new(engine))
        }
        #[cfg(not(feature = "ocr"))]
        OcrBackendKind::Tesseract => {
            let _ = client;
            Err(anyhow!("Tesseract OCR requested but the 'ocr' feature is not compiled in"))
        }
    }
}
