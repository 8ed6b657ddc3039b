use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart body accepted by `POST /ask`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct AskForm {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub question: String,
    /// Generated answer, returned verbatim
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Passages in the question-answering index
    pub passages: usize,
}
