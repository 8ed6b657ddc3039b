/*!
 * Test Helpers and Utilities
 *
 * In-process stand-ins for the OCR engine and the model backends, plus
 * builders for configuration, application state and multipart bodies.
 * Tests can modify the returned objects as needed.
 */

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{
    config::{Config, NerBackendKind, OcrBackendKind},
    identity::IdentityExtractor,
    models::{BoundingBox, TextRegion},
    ner::HeuristicNerBackend,
    ocr::{preprocess::PreparedImage, OcrEngine, OcrError, OcrService},
    rag::{Embedder, Generator, RagError, RagOptions, RagPipeline},
    AppState,
};

/// Short rental contract indexed by test application states
pub const TEST_CONTRACT: &str = "The tenant pays a monthly rent of 900 EUR. Rent is due on the first day of the month. \
    A deposit of two months rent is required. The deposit is returned within 30 days. \
    Pets are not allowed in the apartment. Smoking is prohibited inside the building.";

pub const MULTIPART_BOUNDARY: &str = "idmatch-test-boundary";

/// Creates a test configuration with sensible defaults
/// All fields are populated to avoid compilation errors when new fields are added
pub fn create_test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        huggingface_token: Some("hf_test_token".to_string()),
        hf_inference_url: "http://127.0.0.1:9/models".to_string(),
        embedding_model: "test/embedder".to_string(),
        generation_model: "test/generator".to_string(),
        reference_document: Some(PathBuf::from("/tmp/idmatch_test_contract.txt")),
        rag_top_k: 3,
        rag_sentences_per_passage: 2,

        // OCR and NER
        ocr_backend: OcrBackendKind::Remote,
        ocr_service_url: Some("http://127.0.0.1:9/ocr".to_string()),
        ocr_language: "eng".to_string(),
        ocr_confidence_threshold: 0.25,
        deskew_images: true,
        ner_backend: NerBackendKind::Heuristic,
        ner_service_url: None,

        max_upload_mb: 5,
        http_timeout_seconds: 5,
    }
}

/// A text region with a simple rectangular box
pub fn test_region(text: &str, top: i32) -> TextRegion {
    TextRegion {
        bounding_box: BoundingBox::from_rect(20, top, 240, 24),
        text: text.to_string(),
        confidence: 0.95,
    }
}

/// A white 200x100 PNG
pub fn blank_png() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(200, 100, image::Rgb([255, 255, 255]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buffer.into_inner()
}

/// OCR engine that returns fixed regions and counts its invocations
pub struct StaticOcrEngine {
    regions: Vec<TextRegion>,
    calls: AtomicUsize,
}

impl StaticOcrEngine {
    pub fn new(regions: Vec<TextRegion>) -> Self {
        Self {
            regions,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for StaticOcrEngine {
    fn engine_id(&self) -> &'static str {
        "static"
    }

    async fn read_text(&self, _image: &PreparedImage) -> Result<Vec<TextRegion>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.regions.clone())
    }
}

/// OCR engine whose backend is always down
pub struct FailingOcrEngine;

#[async_trait]
impl OcrEngine for FailingOcrEngine {
    fn engine_id(&self) -> &'static str {
        "failing"
    }

    async fn read_text(&self, _image: &PreparedImage) -> Result<Vec<TextRegion>, OcrError> {
        Err(OcrError::Unavailable("connection refused".to_string()))
    }
}

const EMBEDDING_DIMENSIONS: usize = 64;

/// Hashed bag-of-words embedder; texts sharing words get similar vectors
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % EMBEDDING_DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Generator that answers when a keyword appears in both the query and
/// the retrieved documents, and otherwise says it doesn't know
pub struct KeywordGenerator {
    answers: Vec<(String, String)>,
    prompts: AtomicUsize,
}

impl KeywordGenerator {
    pub fn new(answers: Vec<(&str, &str)>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|(k, a)| (k.to_lowercase(), a.to_string()))
                .collect(),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts_seen(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for KeywordGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let query = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Query: "))
            .unwrap_or_default()
            .to_lowercase();
        let documents = prompt
            .split_once("Documents:\n")
            .and_then(|(_, rest)| rest.split_once("\nAnswer:"))
            .map(|(docs, _)| docs.to_lowercase())
            .unwrap_or_default();

        let answer = self
            .answers
            .iter()
            .find(|(keyword, _)| query.contains(keyword.as_str()) && documents.contains(keyword.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| "I don't know".to_string());

        // Real models pad their output
        Ok(format!(" {}\n", answer))
    }
}

/// Generator whose backend is always down
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
        Err(RagError::Backend("test/generator returned HTTP 503: loading".to_string()))
    }
}

/// Generator answering the three questions `TEST_CONTRACT` covers
pub fn contract_generator() -> KeywordGenerator {
    KeywordGenerator::new(vec![
        ("deposit", "Two months of rent."),
        ("rent", "900 EUR per month."),
        ("pets", "No, pets are not allowed."),
    ])
}

/// Builds application state over `TEST_CONTRACT` with the given engines
pub async fn create_test_app_state_with(ocr: Arc<dyn OcrEngine>, generator: Arc<dyn Generator>) -> Arc<AppState> {
    let config = create_test_config();
    let identity = IdentityExtractor::new(OcrService::new(ocr), Arc::new(HeuristicNerBackend::new()));
    let rag = RagPipeline::from_text(
        TEST_CONTRACT,
        Arc::new(KeywordEmbedder::new()),
        generator,
        RagOptions {
            top_k: config.rag_top_k,
            sentences_per_passage: config.rag_sentences_per_passage,
        },
    )
    .await
    .expect("Failed to index test contract");

    Arc::new(AppState {
        config,
        identity: Arc::new(identity),
        rag: Arc::new(rag),
    })
}

/// Builds application state whose OCR engine reads `regions` from any image
pub async fn create_test_app_state(regions: Vec<TextRegion>) -> Arc<AppState> {
    create_test_app_state_with(Arc::new(StaticOcrEngine::new(regions)), Arc::new(contract_generator())).await
}

/// Encodes a multipart/form-data body; returns the content type and bytes
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY), body)
}
