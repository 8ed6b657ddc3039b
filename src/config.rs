use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which OCR engine turns images into text regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrBackendKind {
    /// EasyOCR-style sidecar reached over HTTP
    Remote,
    /// Local Tesseract (requires the `ocr` feature)
    Tesseract,
}

impl FromStr for OcrBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "http" | "easyocr" => Ok(Self::Remote),
            "tesseract" => Ok(Self::Tesseract),
            other => Err(anyhow!("Invalid OCR_BACKEND '{}': expected 'remote' or 'tesseract'", other)),
        }
    }
}

/// Which NER backend labels person names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerBackendKind {
    Heuristic,
    Remote,
}

impl FromStr for NerBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" | "builtin" => Ok(Self::Heuristic),
            "remote" | "http" | "spacy" => Ok(Self::Remote),
            other => Err(anyhow!("Invalid NER_BACKEND '{}': expected 'heuristic' or 'remote'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,

    // Hugging Face inference (embeddings + generation)
    pub huggingface_token: Option<String>,
    pub hf_inference_url: String,
    pub embedding_model: String,
    pub generation_model: String,

    // Retrieval
    pub reference_document: Option<PathBuf>,
    pub rag_top_k: usize,
    pub rag_sentences_per_passage: usize,

    // OCR
    pub ocr_backend: OcrBackendKind,
    pub ocr_service_url: Option<String>,
    pub ocr_language: String,
    pub ocr_confidence_threshold: f32,
    pub deskew_images: bool,

    // NER
    pub ner_backend: NerBackendKind,
    pub ner_service_url: Option<String>,

    // Limits
    pub max_upload_mb: usize,
    pub http_timeout_seconds: u64,
}

const BYTES_PER_MB: usize = 1024 * 1024;

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_HF_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-small-en-v1.5";
pub const DEFAULT_GENERATION_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(anyhow!("Failed to read .env file: {}", e)),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let server_address = get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());

        let hf_inference_url = get("HF_INFERENCE_URL").unwrap_or_else(|| DEFAULT_HF_INFERENCE_URL.to_string());
        validate_url("HF_INFERENCE_URL", &hf_inference_url)?;

        // REFERENCE_DOCUMENT wins; otherwise fall back to the RAW_DATA_FOLDER + PDF_FILE_NAME pair
        let reference_document = match get("REFERENCE_DOCUMENT") {
            Some(path) => Some(PathBuf::from(path)),
            None => match (get("RAW_DATA_FOLDER"), get("PDF_FILE_NAME")) {
                (Some(folder), Some(file)) => Some(PathBuf::from(folder).join(file)),
                (None, Some(file)) => Some(PathBuf::from(file)),
                _ => None,
            },
        };

        let rag_top_k: usize = parse_var(&get, "RAG_TOP_K", 3)?;
        if rag_top_k == 0 {
            return Err(anyhow!("RAG_TOP_K must be at least 1"));
        }
        let rag_sentences_per_passage: usize = parse_var(&get, "RAG_SENTENCES_PER_PASSAGE", 2)?;
        if rag_sentences_per_passage == 0 {
            return Err(anyhow!("RAG_SENTENCES_PER_PASSAGE must be at least 1"));
        }

        let ocr_backend = match get("OCR_BACKEND") {
            Some(value) => value.parse()?,
            None => OcrBackendKind::Remote,
        };
        let ocr_service_url = get("OCR_SERVICE_URL");
        if let Some(url) = &ocr_service_url {
            validate_url("OCR_SERVICE_URL", url)?;
        }
        if ocr_backend == OcrBackendKind::Remote && ocr_service_url.is_none() {
            return Err(anyhow!("OCR_SERVICE_URL is required when OCR_BACKEND=remote"));
        }
        if ocr_backend == OcrBackendKind::Tesseract && !cfg!(feature = "ocr") {
            return Err(anyhow!(
                "OCR_BACKEND=tesseract requires building with the 'ocr' feature"
            ));
        }

        let ocr_confidence_threshold: f32 = parse_var(&get, "OCR_CONFIDENCE_THRESHOLD", 0.25)?;
        if !(0.0..=1.0).contains(&ocr_confidence_threshold) {
            return Err(anyhow!(
                "OCR_CONFIDENCE_THRESHOLD must be between 0 and 1, got {}",
                ocr_confidence_threshold
            ));
        }

        let ner_backend = match get("NER_BACKEND") {
            Some(value) => value.parse()?,
            None => NerBackendKind::Heuristic,
        };
        let ner_service_url = get("NER_SERVICE_URL");
        if let Some(url) = &ner_service_url {
            validate_url("NER_SERVICE_URL", url)?;
        }
        if ner_backend == NerBackendKind::Remote && ner_service_url.is_none() {
            return Err(anyhow!("NER_SERVICE_URL is required when NER_BACKEND=remote"));
        }

        let max_upload_mb: usize = parse_var(&get, "MAX_UPLOAD_MB", 5)?;
        if max_upload_mb == 0 {
            return Err(anyhow!("MAX_UPLOAD_MB must be at least 1"));
        }
        if max_upload_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(anyhow!("MAX_UPLOAD_MB is too large: {}", max_upload_mb));
        }

        Ok(Config {
            server_address,
            huggingface_token: get("HUGGINGFACE_TOKEN"),
            hf_inference_url,
            embedding_model: get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            generation_model: get("GENERATION_MODEL").unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            reference_document,
            rag_top_k,
            rag_sentences_per_passage,
            ocr_backend,
            ocr_service_url,
            ocr_language: get("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string()),
            ocr_confidence_threshold,
            deskew_images: parse_bool(&get, "DESKEW_IMAGES", true)?,
            ner_backend,
            ner_service_url,
            max_upload_mb,
            http_timeout_seconds: parse_var(&get, "HTTP_TIMEOUT_SECONDS", 120)?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }

    /// The token is only needed once the question-answering pipeline is built
    pub fn require_huggingface_token(&self) -> Result<&str> {
        self.huggingface_token
            .as_deref()
            .ok_or_else(|| anyhow!("HUGGINGFACE_TOKEN must be set to build the question-answering pipeline"))
    }

    pub fn require_reference_document(&self) -> Result<&PathBuf> {
        self.reference_document.as_ref().ok_or_else(|| {
            anyhow!("REFERENCE_DOCUMENT (or RAW_DATA_FOLDER and PDF_FILE_NAME) must point at the contract to index")
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(anyhow!("Invalid boolean for {}: '{}'", key, v)),
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| anyhow!("Invalid URL format for {}: '{}' ({})", key, value, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(anyhow!("Invalid URL format for {}: unsupported scheme '{}'", key, scheme)),
    }
}
