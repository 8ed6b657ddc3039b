use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use idmatch::{routes::create_router, test_helpers::create_test_app_state};

#[tokio::test]
async fn test_health_endpoint_responds() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/health")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK, "Health endpoint should return 200 OK");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let health: Value = serde_json::from_slice(&body)?;
    assert_eq!(health["status"], "ok", "Health status should be 'ok'");
    assert_eq!(health["passages"], 3, "Test contract should be indexed as three passages");
    Ok(())
}

#[tokio::test]
async fn test_openapi_document_lists_routes() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api-docs/openapi.json")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let doc: Value = serde_json::from_slice(&body)?;
    for path in ["/upload", "/ask", "/api/health"] {
        assert!(doc["paths"].get(path).is_some(), "OpenAPI document should describe {}", path);
    }
    assert!(doc["components"]["schemas"].get("UploadResponse").is_some());
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<()> {
    let app = create_router(create_test_app_state(vec![]).await);

    let response = app
        .oneshot(Request::builder().uri("/predict").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
