//! Named entity recognition over OCR regions.
//!
//! Provides a `NerBackend` trait for pluggable backends, a built-in
//! heuristic backend tuned for identity documents and an HTTP backend for a
//! spaCy-style sidecar.

pub mod heuristic;
pub mod remote;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, NerBackendKind};
use crate::models::{EntityLabel, NamedEntity, TextRegion};

pub use heuristic::HeuristicNerBackend;
pub use remote::RemoteNerBackend;

/// Person names must have this many whitespace-separated tokens
pub const MIN_NAME_TOKENS: usize = 2;
pub const MAX_NAME_TOKENS: usize = 3;

#[derive(Debug, Error)]
pub enum NerError {
    #[error("NER service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid NER response: {0}")]
    InvalidResponse(String),
}

/// An entity as reported by a backend, before it is tied to a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    pub text: String,
    pub label: EntityLabel,
}

#[async_trait]
pub trait NerBackend: Send + Sync {
    /// Human-readable backend identifier (e.g. "heuristic", "remote")
    fn backend_id(&self) -> &str;

    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, NerError>;
}

/// Run NER region by region and keep person names of plausible length.
///
/// Output follows scan order: region order first, then order within the
/// region. Each entity remembers the region it came from.
pub async fn extract_person_names(
    backend: &dyn NerBackend,
    regions: &[TextRegion],
) -> Result<Vec<NamedEntity>, NerError> {
    let mut names = Vec::new();

    for (region_index, region) in regions.iter().enumerate() {
        for entity in backend.recognize(&region.text).await? {
            if entity.label != EntityLabel::Person {
                continue;
            }
            let token_count = entity.text.split_whitespace().count();
            if !(MIN_NAME_TOKENS..=MAX_NAME_TOKENS).contains(&token_count) {
                continue;
            }
            names.push(NamedEntity {
                text: entity.text.split_whitespace().collect::<Vec<_>>().join(" "),
                label: EntityLabel::Person,
                region_index,
            });
        }
    }

    debug!(
        "NER ({}) found {} person candidates in {} regions",
        backend.backend_id(),
        names.len(),
        regions.len()
    );

    Ok(names)
}

/// Create the configured NER backend
pub fn create_ner_backend(config: &Config, client: Client) -> Result<Arc<dyn NerBackend>> {
    match config.ner_backend {
        NerBackendKind::Heuristic => Ok(Arc::new(HeuristicNerBackend::new())),
        NerBackendKind::Remote => {
            let endpoint = config
                .ner_service_url
                .clone()
                .ok_or_else(|| anyhow!("NER_SERVICE_URL is required when NER_BACKEND=remote"))?;
            tracing::info!("Using remote NER service at {}", endpoint);
            Ok(Arc::new(RemoteNerBackend::new(client, endpoint)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    /// Labels every region's full text with a fixed label
    struct FixedLabelBackend(EntityLabel);

    #[async_trait]
    impl NerBackend for FixedLabelBackend {
        fn backend_id(&self) -> &str {
            "fixed"
        }

        async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, NerError> {
            Ok(vec![RecognizedEntity {
                text: text.to_string(),
                label: self.0.clone(),
            }])
        }
    }

    fn regions(texts: &[&str]) -> Vec<TextRegion> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextRegion {
                bounding_box: BoundingBox::from_rect(0, i as i32 * 20, 100, 18),
                text: t.to_string(),
                confidence: 0.9,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_keeps_names_with_two_or_three_tokens() {
        let backend = FixedLabelBackend(EntityLabel::Person);
        let names = extract_person_names(&backend, &regions(&["Smith", "John Smith", "Mary Ann Jones", "A B C D"]))
            .await
            .unwrap();

        let texts: Vec<_> = names.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["John Smith", "Mary Ann Jones"]);
        assert_eq!(names[0].region_index, 1);
        assert_eq!(names[1].region_index, 2);
    }

    #[tokio::test]
    async fn test_ignores_non_person_entities() {
        let backend = FixedLabelBackend(EntityLabel::Organization);
        let names = extract_person_names(&backend, &regions(&["Acme Corp"])).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_no_regions_no_names() {
        let backend = FixedLabelBackend(EntityLabel::Person);
        assert!(extract_person_names(&backend, &[]).await.unwrap().is_empty());
    }
}
