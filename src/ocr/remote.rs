//! OCR through an HTTP sidecar that speaks EasyOCR's `readtext` shape:
//! a JSON array of `{"box": [[x, y] x4], "text": "...", "confidence": 0.93}`.

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::preprocess::PreparedImage;
use super::{OcrEngine, OcrError};
use crate::models::{BoundingBox, TextRegion};

#[derive(Debug, Deserialize)]
struct RemoteRegion {
    #[serde(rename = "box")]
    bbox: Vec<[f64; 2]>,
    text: String,
    #[serde(default, alias = "score", alias = "conf")]
    confidence: f32,
}

pub struct RemoteOcrEngine {
    client: Client,
    endpoint: String,
}

impl RemoteOcrEngine {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    fn engine_id(&self) -> &'static str {
        "remote"
    }

    async fn read_text(&self, image: &PreparedImage) -> Result<Vec<TextRegion>, OcrError> {
        let part = multipart::Part::bytes(image.png.clone())
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::Unavailable(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_GATEWAY => {
                    OcrError::Unavailable(format!("HTTP {}: {}", status, body))
                }
                _ => OcrError::Engine(format!("HTTP {}: {}", status, body)),
            });
        }

        let remote: Vec<RemoteRegion> = response
            .json()
            .await
            .map_err(|e| OcrError::Engine(format!("invalid OCR response: {}", e)))?;

        debug!("Remote OCR returned {} regions", remote.len());

        Ok(remote
            .into_iter()
            .filter_map(|r| match BoundingBox::from_points(&r.bbox) {
                Some(bounding_box) => Some(TextRegion {
                    bounding_box,
                    text: r.text,
                    confidence: r.confidence,
                }),
                None => {
                    warn!("Skipping OCR region '{}' without coordinates", r.text);
                    None
                }
            })
            .collect())
    }
}
