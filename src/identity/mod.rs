//! The document-to-identity-match pipeline:
//! OCR regions -> person candidates -> fuzzy score -> best match.

pub mod scoring;

use std::sync::Arc;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ClaimedName, MatchResult};
use crate::ner::{extract_person_names, NerBackend};
use crate::ocr::OcrService;
use scoring::{select_best_candidate, split_name};

pub struct IdentityExtractor {
    ocr: OcrService,
    ner: Arc<dyn NerBackend>,
}

impl IdentityExtractor {
    pub fn new(ocr: OcrService, ner: Arc<dyn NerBackend>) -> Self {
        Self { ocr, ner }
    }

    /// Find the name on the document that best matches `claimed`.
    ///
    /// No text or no person-like text yields `MatchResult::no_match()`, not an
    /// error. Filename validation happens before this is called.
    pub async fn extract(&self, image_bytes: &[u8], claimed: &ClaimedName) -> Result<MatchResult, AppError> {
        let regions = self.ocr.extract_regions(image_bytes).await?;
        if regions.is_empty() {
            info!("No legible text found on document");
            return Ok(MatchResult::no_match());
        }

        let candidates = extract_person_names(self.ner.as_ref(), &regions).await?;
        let claimed_full_name = claimed.full_name();

        let Some((index, score)) = select_best_candidate(&candidates, &claimed_full_name) else {
            info!("No person name found among {} text regions", regions.len());
            return Ok(MatchResult::no_match());
        };

        let winner = &candidates[index];
        let (first_name, last_name) = split_name(&winner.text);
        info!(
            "Matched '{}' against claimed '{}' with score {}",
            winner.text, claimed_full_name, score
        );

        Ok(MatchResult {
            first_name,
            last_name,
            bounding_box: Some(regions[winner.region_index].bounding_box),
            similarity_score: score,
        })
    }
}
