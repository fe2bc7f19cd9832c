use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /subscribe`. Fields other than `email` are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
}

/// Response body of the gateway routes: `{"Message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayMessage {
    #[serde(rename = "Message")]
    pub message: String,
}

impl GatewayMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
