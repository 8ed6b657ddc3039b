use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::identity::required_text;
use crate::errors::AppError;
use crate::models::{AskForm, AskResponse, ErrorResponse};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ask", post(ask))
}

#[derive(Debug, Deserialize)]
struct QuestionFields {
    question: Option<String>,
}

/// The `question` field of a multipart or urlencoded form body
pub struct QuestionForm(pub Option<String>);

impl<S> FromRequest<S> for QuestionForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            while let Some(field) = multipart.next_field().await? {
                if field.name() == Some("question") {
                    return Ok(Self(Some(field.text().await?)));
                }
            }
            Ok(Self(None))
        } else {
            let Form(fields) = Form::<QuestionFields>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            Ok(Self(fields.question))
        }
    }
}

#[utoipa::path(
    post,
    path = "/ask",
    tag = "qa",
    request_body(content = AskForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Answer generated from the reference document", body = AskResponse),
        (status = 400, description = "Missing or empty question", body = ErrorResponse),
        (status = 503, description = "Embedding or generation backend unavailable", body = ErrorResponse)
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    QuestionForm(question): QuestionForm,
) -> Result<Json<AskResponse>, AppError> {
    let question = required_text(question, "question")?;
    info!("Answering question ({} chars)", question.len());

    let response = state.rag.answer(&question).await?;

    Ok(Json(AskResponse { question, response }))
}
