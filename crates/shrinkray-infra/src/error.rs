//! HTTP error response body
//!
//! `IntoResponse` for `AppError` lives in `shrinkray-api`: the orphan rule keeps
//! it out of here since both the trait and the error type are foreign.

use serde::{Deserialize, Serialize};

/// Standard error response format for HTTP routes
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: None,
        }
    }
}
