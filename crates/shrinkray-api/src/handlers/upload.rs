use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use shrinkray_core::constants::{PROCESSED_CONTENT_TYPE, UPLOAD_RESPONSE_MESSAGE};
use shrinkray_core::models::GatewayMessage;
use shrinkray_core::{AppError, UploadNotification};

use crate::error::HttpAppError;
use crate::state::AppState;

const OCTET_STREAM: &str = "application/octet-stream";

/// Store the request body as `{bucket}/{filename}`.
///
/// The response reflects the store call only; processing happens later, off
/// the request path.
#[tracing::instrument(skip(state, headers, body), fields(operation = "upload_image", size_bytes = body.len()))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path((bucket, filename)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GatewayMessage>, HttpAppError> {
    let upload = &state.upload;

    if !upload.is_allowed_bucket(&bucket) {
        return Err(AppError::Forbidden(format!(
            "Uploads to bucket '{}' are not allowed",
            bucket
        ))
        .into());
    }

    // Untyped binary bodies are taken as JPEG, the gateway's binary media type.
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| !ct.is_empty() && !ct.starts_with(OCTET_STREAM))
        .unwrap_or(PROCESSED_CONTENT_TYPE)
        .to_string();

    upload.validator.validate(&body)?;
    upload.validator.validate_content_type(&content_type)?;

    let size = body.len() as u64;
    state
        .storage
        .put(&bucket, &filename, body, &content_type)
        .await?;

    tracing::info!(
        bucket = %bucket,
        key = %filename,
        content_type = %content_type,
        size_bytes = size,
        "Image uploaded"
    );

    if upload.is_raw_bucket(&bucket) {
        if let Some(queue) = &state.pipeline {
            enqueue(queue, &bucket, &filename, size);
        }
    }

    Ok(Json(GatewayMessage::new(UPLOAD_RESPONSE_MESSAGE)))
}

fn enqueue(queue: &shrinkray_worker::LocalQueue, bucket: &str, key: &str, size: u64) {
    let mut notification = UploadNotification::new(bucket, key);
    notification.size = Some(size);

    let result = notification
        .to_message_body()
        .map_err(anyhow::Error::from)
        .and_then(|body| queue.send(body).map_err(anyhow::Error::from));

    match result {
        Ok(message_id) => {
            tracing::debug!(message_id = %message_id, bucket = %bucket, key = %key, "Object-created notification enqueued");
        }
        Err(e) => {
            tracing::warn!(error = %e, bucket = %bucket, key = %key, "Failed to enqueue object-created notification");
        }
    }
}
