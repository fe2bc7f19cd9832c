mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use helpers::{
    create_test_png, setup_test_app, setup_test_app_with, test_config, PROCESSED_BUCKET,
    RAW_BUCKET, TOPIC_ARN,
};
use serde_json::{json, Value};
use shrinkray_storage::Storage;
use shrinkray_worker::{DeliveryOutcome, RecordOutcome};
use std::time::Duration;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_subscribe_forwards_email_only() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/subscribe")
        .json(&json!({
            "email": "user@example.com",
            "Protocol": "sms",
            "TopicArn": "arn:aws:sns:us-east-1:000000000000:Elsewhere"
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "Message": "Subscription request has been sent." }));

    let calls = app.notifier.subscribes();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].protocol, "email");
    assert_eq!(calls[0].topic_arn, TOPIC_ARN);
    assert_eq!(calls[0].endpoint, "user@example.com");
}

#[tokio::test]
async fn test_subscribe_rejects_invalid_email() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/subscribe")
        .json(&json!({ "email": "not-an-address" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.notifier.subscribes().is_empty());
}

#[tokio::test]
async fn test_subscribe_rejects_malformed_json() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/subscribe")
        .bytes(Bytes::from_static(b"{\"email\":"))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.notifier.subscribes().is_empty());
}

#[tokio::test]
async fn test_upload_stores_object() {
    let app = setup_test_app().await;
    let image = create_test_png(32, 32);

    let response = app
        .server
        .put(&format!("/upload-image/{}/cat.png", RAW_BUCKET))
        .bytes(Bytes::from(image.clone()))
        .content_type("image/png")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "Message": "Image was uploaded successfully. Make sure to subscribe to receive the image link."
    }));

    let stored = app.storage.get(RAW_BUCKET, "cat.png").await.unwrap();
    assert_eq!(stored.as_ref(), image.as_slice());
    assert!(app.notifier.published().is_empty());
}

#[tokio::test]
async fn test_upload_without_content_type_is_stored_as_jpeg() {
    let app = setup_test_app().await;

    let response = app
        .server
        .put(&format!("/upload-image/{}/raw.jpg", PROCESSED_BUCKET))
        .bytes(Bytes::from_static(b"\xff\xd8\xff\xe0 jpeg-ish"))
        .await;

    response.assert_status_ok();
    assert!(app.storage.exists(PROCESSED_BUCKET, "raw.jpg").await.unwrap());
}

#[tokio::test]
async fn test_upload_rejects_unknown_bucket() {
    let app = setup_test_app().await;

    let response = app
        .server
        .put("/upload-image/someone-elses-bucket/cat.png")
        .bytes(Bytes::from(create_test_png(8, 8)))
        .content_type("image/png")
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_upload_rejects_empty_body() {
    let app = setup_test_app().await;

    let response = app
        .server
        .put(&format!("/upload-image/{}/empty.png", RAW_BUCKET))
        .bytes(Bytes::new())
        .content_type("image/png")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.storage.exists(RAW_BUCKET, "empty.png").await.unwrap());
}

#[tokio::test]
async fn test_upload_rejects_oversized_body() {
    let app = setup_test_app().await;

    let response = app
        .server
        .put(&format!("/upload-image/{}/big.png", RAW_BUCKET))
        .bytes(Bytes::from(vec![0u8; 64 * 1024 + 1]))
        .content_type("image/png")
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_content_type() {
    let app = setup_test_app().await;

    let response = app
        .server
        .put(&format!("/upload-image/{}/notes.txt", RAW_BUCKET))
        .bytes(Bytes::from_static(b"hello"))
        .content_type("text/plain")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = setup_test_app().await;

    let response = app
        .server
        .get("/health")
        .add_header("X-Request-ID", "req-123")
        .await;

    assert_eq!(response.header("X-Request-ID"), "req-123");
}

#[tokio::test]
async fn test_local_pipeline_processes_raw_uploads() {
    let mut config = test_config();
    config.local_pipeline_enabled = true;
    let app = setup_test_app_with(config).await;

    let queue = app.state.pipeline.as_ref().expect("local pipeline enabled");
    let mut reports = queue.subscribe();

    let response = app
        .server
        .put(&format!("/upload-image/{}/my%20photo.png", RAW_BUCKET))
        .bytes(Bytes::from(create_test_png(40, 20)))
        .content_type("image/png")
        .await;
    response.assert_status_ok();

    let report = tokio::time::timeout(Duration::from_secs(10), reports.recv())
        .await
        .expect("delivery report")
        .expect("report channel open");

    match report.outcome {
        DeliveryOutcome::Completed(batch) => {
            assert_eq!(batch.processed(), 1);
            assert!(matches!(
                &batch.records[0].outcome,
                RecordOutcome::Processed { processed_key, .. } if processed_key == "processed-my photo.png"
            ));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(app
        .storage
        .exists(PROCESSED_BUCKET, "processed-my photo.png")
        .await
        .unwrap());
    assert!(!app.storage.exists(RAW_BUCKET, "my photo.png").await.unwrap());

    let published = app.notifier.published();
    assert_eq!(published.len(), 1);
    assert!(published[0]
        .email
        .contains("http://localhost:3000/files/processed-images/processed-my photo.png?expires="));
}

#[tokio::test]
async fn test_processed_bucket_uploads_are_not_queued() {
    let mut config = test_config();
    config.local_pipeline_enabled = true;
    let app = setup_test_app_with(config).await;

    let queue = app.state.pipeline.as_ref().expect("local pipeline enabled");
    let mut reports = queue.subscribe();

    app.server
        .put(&format!("/upload-image/{}/direct.png", PROCESSED_BUCKET))
        .bytes(Bytes::from(create_test_png(8, 8)))
        .content_type("image/png")
        .await
        .assert_status_ok();

    let waited = tokio::time::timeout(Duration::from_millis(200), reports.recv()).await;
    assert!(waited.is_err());
    assert!(app.notifier.published().is_empty());
}
