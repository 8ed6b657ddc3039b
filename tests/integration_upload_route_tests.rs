use anyhow::Result;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use idmatch::{
    models::TextRegion,
    routes::create_router,
    test_helpers::{
        blank_png, contract_generator, create_test_app_state, create_test_app_state_with, multipart_body,
        test_region, FailingOcrEngine, StaticOcrEngine,
    },
};

async fn post_upload(app: Router, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Result<(StatusCode, Value)> {
    let (content_type, body) = multipart_body(fields, file);
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/upload")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))?,
        )
        .await?;

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

fn passport_regions() -> Vec<TextRegion> {
    vec![
        test_region("PASSPORT", 10),
        test_region("UNITED KINGDOM OF GREAT BRITAIN", 40),
        test_region("SURNAME", 80),
        test_region("JOHN SMITH", 110),
        test_region("DATE OF BIRTH 01 JAN 1990", 150),
    ]
}

const CLAIM: [(&str, &str); 2] = [("first_name", "John"), ("last_name", "Smith")];

#[tokio::test]
async fn test_matching_name_scores_high() -> Result<()> {
    let app = create_router(create_test_app_state(passport_regions()).await);
    let png = blank_png();

    let (status, body) = post_upload(app, &CLAIM, Some(("passport.png", &png))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "John");
    assert_eq!(body["last_name"], "Smith");
    assert!(body["similarity_score"].as_u64().unwrap() >= 90);
    assert_eq!(
        body["bounding_box_cords"],
        serde_json::json!([[20, 110], [260, 110], [260, 134], [20, 134]])
    );
    Ok(())
}

#[tokio::test]
async fn test_claim_case_does_not_matter() -> Result<()> {
    let app = create_router(create_test_app_state(passport_regions()).await);
    let png = blank_png();

    let (status, body) =
        post_upload(app, &[("first_name", "JOHN"), ("last_name", "smith")], Some(("scan.JPG", &png))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similarity_score"], 100);
    Ok(())
}

#[tokio::test]
async fn test_blank_page_is_a_successful_empty_match() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);
    let png = blank_png();

    let (status, body) = post_upload(app, &CLAIM, Some(("blank.png", &png))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "");
    assert_eq!(body["last_name"], "");
    assert_eq!(body["similarity_score"], 0);
    assert_eq!(body["bounding_box_cords"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn test_invalid_extension_is_rejected_before_ocr() -> Result<()> {
    let engine = Arc::new(StaticOcrEngine::new(passport_regions()));
    let state = create_test_app_state_with(engine.clone(), Arc::new(contract_generator())).await;
    let app = create_router(state);

    let (status, body) = post_upload(app, &CLAIM, Some(("passport.pdf", b"%PDF-1.7"))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file format. Should be .jpeg, .jpg or .png");
    assert_eq!(engine.calls(), 0, "OCR must not run for rejected files");
    Ok(())
}

#[tokio::test]
async fn test_corrupt_image_is_bad_request() -> Result<()> {
    let engine = Arc::new(StaticOcrEngine::new(passport_regions()));
    let state = create_test_app_state_with(engine.clone(), Arc::new(contract_generator())).await;
    let app = create_router(state);

    let (status, body) = post_upload(app, &CLAIM, Some(("passport.jpg", b"definitely not a jpeg"))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("decode"));
    assert_eq!(engine.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_file_part() -> Result<()> {
    let app = create_router(create_test_app_state(passport_regions()).await);

    let (status, body) = post_upload(app, &CLAIM, None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part in the request");
    Ok(())
}

#[tokio::test]
async fn test_missing_or_blank_names() -> Result<()> {
    let png = blank_png();

    let app = create_router(create_test_app_state(passport_regions()).await);
    let (status, body) = post_upload(app, &[("first_name", "John")], Some(("passport.png", &png))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("last_name"));

    let app = create_router(create_test_app_state(passport_regions()).await);
    let (status, body) =
        post_upload(app, &[("first_name", "  "), ("last_name", "Smith")], Some(("passport.png", &png))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("first_name"));
    Ok(())
}

#[tokio::test]
async fn test_ocr_outage_is_service_unavailable() -> Result<()> {
    let state = create_test_app_state_with(Arc::new(FailingOcrEngine), Arc::new(contract_generator())).await;
    let app = create_router(state);
    let png = blank_png();

    let (status, body) = post_upload(app, &CLAIM, Some(("passport.png", &png))).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("OCR service unavailable"));
    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() -> Result<()> {
    let app = create_router(create_test_app_state(passport_regions()).await);
    let oversized = vec![0u8; 6 * 1024 * 1024];

    let (content_type, body) = multipart_body(&CLAIM, Some(("huge.png", &oversized)));
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/upload")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
