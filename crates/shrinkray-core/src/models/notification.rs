use serde::{Deserialize, Serialize};

use crate::constants::NOTIFICATION_DEFAULT_TEXT;

/// Message published to the topic once an image has been processed.
///
/// Delivered with structural fan-out: `default` goes to every protocol without
/// a dedicated rendering, `email` to email subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub default: String,
    pub email: String,
}

impl NotificationMessage {
    /// Completion message carrying the link to the processed image.
    pub fn processed(presigned_url: &str) -> Self {
        Self {
            default: NOTIFICATION_DEFAULT_TEXT.to_string(),
            email: format!(
                "Your image has been processed and is available at the following link: {}",
                presigned_url
            ),
        }
    }

    /// JSON document published with `MessageStructure=json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
