//! Reference document loading.
//!
//! PDFs go through `pdftotext` (poppler-utils); `.txt` and `.md` files are
//! read as-is.

use std::path::Path;
use tracing::{debug, info};

use super::RagError;

pub async fn load_document(path: &Path) -> Result<String, RagError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf_text(path).await?,
        "txt" | "md" | "text" => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RagError::Load(format!("failed to read {}: {}", path.display(), e)))?,
        other => {
            return Err(RagError::Load(format!(
                "unsupported reference document type '{}' for {}",
                other,
                path.display()
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(RagError::EmptyDocument(path.to_path_buf()));
    }

    info!("Loaded reference document {} ({} characters)", path.display(), text.len());
    Ok(text)
}

async fn extract_pdf_text(path: &Path) -> Result<String, RagError> {
    if !path.exists() {
        return Err(RagError::Load(format!("reference document {} does not exist", path.display())));
    }

    debug!("Extracting text from {} with pdftotext", path.display());
    let output = tokio::process::Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-") // write to stdout
        .output()
        .await
        .map_err(|e| {
            RagError::Load(format!(
                "pdftotext is not available ({}). On Ubuntu/Debian: 'apt-get install poppler-utils'. \
                 On macOS: 'brew install poppler'.",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RagError::Load(format!(
            "pdftotext failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
