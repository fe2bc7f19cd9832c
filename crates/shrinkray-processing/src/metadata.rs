use serde::{Deserialize, Serialize};

/// Basic facts about an encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Detected container format, e.g. `Png`.
    pub format: String,
    pub size_bytes: u64,
}
