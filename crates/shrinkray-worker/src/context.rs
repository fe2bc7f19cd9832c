//! Batch handler trait
//!
//! The local queue invokes a `MessageHandler` with one batch per delivery, the
//! way the queue's event source mapping invokes the deployed function.

use async_trait::async_trait;
use aws_lambda_events::event::sqs::SqsEvent;

use crate::report::BatchReport;

#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process every record of the batch. Record failures are reported, never
    /// returned as an error.
    async fn handle_batch(&self, event: &SqsEvent) -> BatchReport;
}
