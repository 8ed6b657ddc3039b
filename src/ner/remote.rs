//! NER through an HTTP sidecar (e.g. a spaCy `en_core_web_md` wrapper).
//!
//! Request: `{"text": "..."}`. Response: `{"entities": [{"text": "...", "label": "PERSON"}]}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{NerBackend, NerError, RecognizedEntity};
use crate::models::EntityLabel;

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    #[serde(default)]
    entities: Vec<NerEntity>,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    text: String,
    label: String,
}

pub struct RemoteNerBackend {
    client: Client,
    endpoint: String,
}

impl RemoteNerBackend {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NerBackend for RemoteNerBackend {
    fn backend_id(&self) -> &str {
        "remote"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, NerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest { text })
            .send()
            .await
            .map_err(|e| NerError::Unavailable(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NerError::Unavailable(format!("HTTP {}: {}", status, body)));
        }

        let parsed: NerResponse = response
            .json()
            .await
            .map_err(|e| NerError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .entities
            .into_iter()
            .map(|e| RecognizedEntity {
                label: EntityLabel::from_label(&e.label),
                text: e.text,
            })
            .collect())
    }
}
