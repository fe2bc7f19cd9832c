//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Component errors
//! convert into `AppError` first so every route renders the same body.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use shrinkray_core::{AppError, ErrorMetadata, LogLevel};
use shrinkray_infra::ErrorResponse;
use shrinkray_notify::NotifyError;
use shrinkray_processing::ValidationError;
use shrinkray_storage::StorageError;

/// Wrapper that lets `AppError` (foreign to this crate) implement `IntoResponse`.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound { bucket, key } => {
                AppError::NotFound(format!("{}/{}", bucket, key))
            }
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app_error = match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidContentType { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ValidationError::EmptyFile => AppError::BadRequest(err.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<NotifyError> for HttpAppError {
    fn from(err: NotifyError) -> Self {
        HttpAppError(AppError::Notification(err.to_string()))
    }
}

/// JSON body extractor that rejects with the standard error body (400).
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod"))
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let mut body = ErrorResponse::new(app_error.client_message());
        body.code = Some(app_error.error_code().to_string());
        if !is_production_env() && !app_error.is_sensitive() {
            body.details = Some(app_error.detailed_message());
            body.error_type = Some(app_error.error_type().to_string());
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<HttpAppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_storage_errors_map_to_status() {
        assert_eq!(
            status_of(StorageError::InvalidKey("../etc".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StorageError::UploadFailed("denied".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_validation_errors_map_to_status() {
        assert_eq!(status_of(ValidationError::EmptyFile), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ValidationError::FileTooLarge { size: 2, max: 1 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(ValidationError::InvalidContentType {
                content_type: "text/plain".to_string(),
                allowed: vec![],
            }),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_notify_error_is_bad_gateway() {
        assert_eq!(status_of(NotifyError::Timeout), StatusCode::BAD_GATEWAY);
    }
}
