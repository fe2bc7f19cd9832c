/// Upper bound of an event source mapping batch for a standard queue
/// without a batching window.
const MAX_BATCH_SIZE: u32 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StackError {
    #[error("batch size must be between 1 and 10, got {0}")]
    InvalidBatchSize(u32),

    #[error("function timeout ({timeout}s) exceeds the queue visibility timeout ({visibility}s)")]
    TimeoutExceedsVisibility { timeout: u32, visibility: u32 },

    #[error("stage name must not be empty")]
    EmptyStageName,
}

/// Tunables of the pipeline stack. Defaults match the deployed pipeline.
#[derive(Debug, Clone)]
pub struct StackProps {
    pub description: String,
    pub queue_visibility_timeout_secs: u32,
    pub batch_size: u32,
    pub function_timeout_secs: u32,
    pub function_memory_mb: u32,
    pub rest_api_name: String,
    pub stage_name: String,
    pub binary_media_types: Vec<String>,
}

impl Default for StackProps {
    fn default() -> Self {
        Self {
            description: "Image upload and processing pipeline".to_string(),
            queue_visibility_timeout_secs: 300,
            batch_size: 1,
            function_timeout_secs: 60,
            function_memory_mb: 512,
            rest_api_name: "ImageUploadService".to_string(),
            stage_name: "prod".to_string(),
            binary_media_types: vec!["image/jpeg".to_string()],
        }
    }
}

impl StackProps {
    pub fn validate(&self) -> Result<(), StackError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(StackError::InvalidBatchSize(self.batch_size));
        }
        if self.function_timeout_secs > self.queue_visibility_timeout_secs {
            return Err(StackError::TimeoutExceedsVisibility {
                timeout: self.function_timeout_secs,
                visibility: self.queue_visibility_timeout_secs,
            });
        }
        if self.stage_name.trim().is_empty() {
            return Err(StackError::EmptyStageName);
        }
        Ok(())
    }
}
