use anyhow::Result;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use idmatch::{
    routes::create_router,
    test_helpers::{
        create_test_app_state, create_test_app_state_with, multipart_body, FailingGenerator, StaticOcrEngine,
    },
};

async fn send(app: Router, content_type: String, body: Vec<u8>) -> Result<(StatusCode, Value)> {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/ask")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))?,
        )
        .await?;

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

async fn ask(app: Router, question: &str) -> Result<(StatusCode, Value)> {
    let (content_type, body) = multipart_body(&[("question", question)], None);
    send(app, content_type, body).await
}

#[tokio::test]
async fn test_answerable_question() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let (status, body) = ask(app, "How much is the monthly rent?").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"], "How much is the monthly rent?");
    assert_eq!(body["response"], "900 EUR per month.");
    Ok(())
}

#[tokio::test]
async fn test_urlencoded_form_is_accepted() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let (status, body) = send(
        app,
        "application/x-www-form-urlencoded".to_string(),
        b"question=Are+pets+allowed%3F".to_vec(),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"], "Are pets allowed?");
    assert_eq!(body["response"], "No, pets are not allowed.");
    Ok(())
}

#[tokio::test]
async fn test_unanswerable_question_is_not_an_error() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let (status, body) = ask(app, "What is the landlord's phone number?").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "I don't know");
    Ok(())
}

#[tokio::test]
async fn test_empty_question_is_rejected() -> Result<()> {
    for question in ["", "   \n\t"] {
        let app = create_router(create_test_app_state(vec![]).await);
        let (status, body) = ask(app, question).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "question {:?} should be rejected", question);
        assert!(body["error"].as_str().unwrap().contains("question"));
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_question_field_is_rejected() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let (content_type, body) = multipart_body(&[("query", "How much is the rent?")], None);
    let (status, _) = send(app, content_type, body).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_questions_get_their_own_answers() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);
    let questions = [
        ("How much is the rent?", "900 EUR per month."),
        ("How large is the deposit?", "Two months of rent."),
        ("Are pets allowed?", "No, pets are not allowed."),
        ("Who pays for the internet?", "I don't know"),
    ];

    let requests = questions
        .iter()
        .cycle()
        .take(16)
        .map(|(question, _)| ask(app.clone(), question));
    let results = join_all(requests).await;

    for (result, (question, expected)) in results.into_iter().zip(questions.iter().cycle()) {
        let (status, body) = result?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"], *question);
        assert_eq!(body["response"], *expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_generator_outage_is_service_unavailable() -> Result<()> {
    let state = create_test_app_state_with(Arc::new(StaticOcrEngine::new(vec![])), Arc::new(FailingGenerator)).await;
    let app = create_router(state);

    let (status, body) = ask(app, "How much is the rent?").await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("503"));
    Ok(())
}
