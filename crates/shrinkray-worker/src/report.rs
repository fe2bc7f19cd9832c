use serde::Serialize;
use shrinkray_core::constants::BATCH_ACK_MESSAGE;

/// Why a record was not processed, without it being a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Source bucket is the processed bucket.
    RecursionGuard,
    /// Storage service test notification.
    TestEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Processed {
        processed_key: String,
        notification_id: String,
    },
    /// Redelivery of a message whose run already completed.
    Duplicate { processed_key: String },
    Skipped { reason: SkipReason },
    Failed { stage: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub message_id: Option<String>,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub outcome: RecordOutcome,
}

/// Outcome of one batch invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn push(&mut self, record: RecordReport) {
        self.records.push(record);
    }

    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Processed { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Duplicate { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn count(&self, predicate: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Value returned to the function runtime for every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded string, so the message arrives quoted.
    pub body: String,
}

impl HandlerResponse {
    /// The fixed acknowledgment, independent of per-record outcomes.
    pub fn completed() -> Self {
        Self {
            status_code: 200,
            body: format!("\"{}\"", BATCH_ACK_MESSAGE),
        }
    }
}
